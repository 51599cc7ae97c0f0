// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use serde::{Serialize, Serializer};
use std::str::FromStr;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Error returned when a requested position type name is not in the table.
///
/// This is a user input error. It is never retried and never coerced to the
/// default type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown position type \"{0}\"")]
pub struct UnknownPositionType(pub String);

/// Unit used to report the speed of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Knots,
}

impl SpeedUnit {
    /// Converts a speed given in meters per second into this unit.
    pub fn from_mps(self, mps: f64) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => mps,
            SpeedUnit::KilometersPerHour => mps * 3.6,
            SpeedUnit::MilesPerHour => mps * 3600.0 / 1609.344,
            SpeedUnit::Knots => mps * 3600.0 / 1852.0,
        }
    }
}

/// Output formats a position can be requested in.
///
/// The table is fixed and ordered. Every entry has a unique canonical name
/// that is matched exactly (case-sensitive, no partial matches).
///
/// | type     | latitude & longitude | speed | altitude | track  |
/// |----------|----------------------|-------|----------|--------|
/// | WGS84    | degree               | m/s   | meter    | degree |
/// | DMS.km/h | deg°min'sec"X        | km/h  | meter    | degree |
/// | DMS.mph  | deg°min'sec"X        | mph   | meter    | degree |
/// | DMS.kn   | deg°min'sec"X        | kn    | meter    | degree |
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCountMacro,
)]
pub enum PositionType {
    #[strum(serialize = "WGS84")]
    Wgs84,
    #[strum(serialize = "DMS.km/h")]
    DmsKmh,
    #[strum(serialize = "DMS.mph")]
    DmsMph,
    #[strum(serialize = "DMS.kn")]
    DmsKnots,
}

impl PositionType {
    /// Type used when a request doesn't name one.
    pub const DEFAULT: PositionType = PositionType::Wgs84;

    /// Number of entries in the type table.
    pub const COUNT: usize = <PositionType as EnumCount>::COUNT;

    /// Resolves an optional type name to a [`PositionType`].
    ///
    /// * `None` resolves to [`PositionType::DEFAULT`].
    /// * A name equal to a canonical name resolves to that type.
    /// * Any other name is rejected with [`UnknownPositionType`].
    pub fn resolve(name: Option<&str>) -> Result<PositionType, UnknownPositionType> {
        match name {
            None => Ok(PositionType::DEFAULT),
            Some(name) => {
                PositionType::from_str(name).map_err(|_| UnknownPositionType(name.to_string()))
            }
        }
    }

    /// The canonical name of the type.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// All types in table order.
    pub fn all() -> impl Iterator<Item = PositionType> {
        PositionType::iter()
    }

    pub fn speed_unit(self) -> SpeedUnit {
        match self {
            PositionType::Wgs84 => SpeedUnit::MetersPerSecond,
            PositionType::DmsKmh => SpeedUnit::KilometersPerHour,
            PositionType::DmsMph => SpeedUnit::MilesPerHour,
            PositionType::DmsKnots => SpeedUnit::Knots,
        }
    }

    /// Whether coordinates are reported as degrees/minutes/seconds strings.
    pub fn uses_dms(self) -> bool {
        !matches!(self, PositionType::Wgs84)
    }
}

impl Serialize for PositionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}
