use crate::position::{GnssPosition, KNOTS_TO_MPS};
use chrono::{NaiveDate, NaiveTime};

/// `GGA` sentence of the reference sample.
pub const MUNICH_GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

/// `RMC` sentence of the reference sample.
pub const MUNICH_RMC: &str =
    "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

/// The position described by [`MUNICH_GGA`] followed by [`MUNICH_RMC`].
pub fn munich_position() -> GnssPosition {
    GnssPosition::new(
        48.0 + 7.038 / 60.0,
        11.0 + 31.0 / 60.0,
        22.4 * KNOTS_TO_MPS,
        &NaiveTime::from_hms_opt(12, 35, 19).unwrap(),
        &NaiveDate::from_ymd_opt(1994, 3, 23).unwrap(),
    )
    .with_track(84.4)
    .with_altitude(545.4)
}
