use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Conversion factor from knots to meters per second.
pub const KNOTS_TO_MPS: f64 = 1852.0 / 3600.0;

/// A complete position sample received from the position stream.
///
/// The sample is assembled by the NMEA parser from a valid `RMC` sentence,
/// enriched with the altitude of the most recent `GGA` sentence. It is the
/// value kept as the latest known position and the input of every
/// subscription dispatch.
///
/// # Example
///
/// ```rust
/// use common::position::GnssPosition;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let time = NaiveTime::from_hms_opt(12, 35, 19).unwrap();
/// let date = NaiveDate::from_ymd_opt(1994, 3, 23).unwrap();
/// let pos = GnssPosition::new(48.1173, 11.5166, 11.5, &time, &date).with_altitude(545.4);
/// assert_eq!(pos.altitude(), Some(545.4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GnssPosition {
    latitude: f64,
    longitude: f64,
    speed: f64,
    altitude: Option<f64>,
    track: Option<f64>,
    time: NaiveTime,
    date: NaiveDate,
}

impl GnssPosition {
    /// Creates a new [`GnssPosition`].
    ///
    /// # Arguments
    ///
    /// * `latitude` – Latitude in decimal degrees. Positive for northern hemisphere.
    /// * `longitude` – Longitude in decimal degrees. Positive for eastern hemisphere.
    /// * `speed` – Speed over ground in meters per second.
    /// * `time` – UTC time of the fix.
    /// * `date` – UTC date of the fix.
    pub fn new(
        latitude: f64,
        longitude: f64,
        speed: f64,
        time: &NaiveTime,
        date: &NaiveDate,
    ) -> GnssPosition {
        GnssPosition {
            latitude,
            longitude,
            speed,
            altitude: None,
            track: None,
            time: *time,
            date: *date,
        }
    }

    /// Attaches an altitude in meters above mean sea level.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Attaches the track made good in degrees.
    pub fn with_track(mut self, track: f64) -> Self {
        self.track = Some(track);
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Speed over ground in meters per second.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn track(&self) -> Option<f64> {
        self.track
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}
