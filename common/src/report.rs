use crate::position::GnssPosition;
use crate::position_type::PositionType;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// A single coordinate rendered for a [`PositionType`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coordinate {
    /// Signed decimal degrees.
    Degrees(f64),
    /// Degrees, minutes and seconds with hemisphere letter, e.g. `48°7'2.28"N`.
    Dms(String),
}

/// A position rendered in the format of a requested [`PositionType`].
///
/// Reports are produced for `getPosition` requests and for every
/// subscription notification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionReport {
    #[serde(rename = "type")]
    pub position_type: PositionType,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub speed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<f64>,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

impl PositionReport {
    /// Renders `position` in the format described by `position_type`.
    pub fn render(position: &GnssPosition, position_type: PositionType) -> Self {
        let (latitude, longitude) = if position_type.uses_dms() {
            (
                Coordinate::Dms(to_dms(position.latitude(), 'N', 'S')),
                Coordinate::Dms(to_dms(position.longitude(), 'E', 'W')),
            )
        } else {
            (
                Coordinate::Degrees(position.latitude()),
                Coordinate::Degrees(position.longitude()),
            )
        };
        PositionReport {
            position_type,
            latitude,
            longitude,
            speed: position_type.speed_unit().from_mps(position.speed()),
            altitude: position.altitude(),
            track: position.track(),
            time: position.time(),
            date: position.date(),
        }
    }
}

/// Formats signed decimal degrees as `deg°min'sec"H`.
///
/// Seconds are rounded to hundredths before splitting, so a value that
/// rounds up to a full minute or degree carries over instead of printing
/// `60.00` seconds.
pub fn to_dms(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let hundredths = (value.abs() * 360_000.0).round() as u64;
    let degrees = hundredths / 360_000;
    let minutes = (hundredths / 6_000) % 60;
    let seconds = hundredths % 6_000;
    format!(
        "{}°{}'{}.{:02}\"{}",
        degrees,
        minutes,
        seconds / 100,
        seconds % 100,
        hemisphere
    )
}
