pub mod manual_clock;
pub mod positions;
