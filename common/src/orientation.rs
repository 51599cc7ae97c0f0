// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Conversion of raw orientation sensor axis counts to angles.
//!
//! The sensor driver itself lives outside this workspace; it delivers raw
//! per-axis integer samples which are turned into angles here.

use std::f64::consts::PI;

/// Angle in degrees spanned by two raw axis readings.
///
/// Computes `atan2(axis_b, axis_c) + π` and scales it to degrees, so the
/// result lies in `[0, 360]`.
pub fn axis_angle(axis_b: i32, axis_c: i32) -> f64 {
    (f64::from(axis_b).atan2(f64::from(axis_c)) + PI).to_degrees()
}

/// Tilt angles derived from a raw accelerometer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerometerAngles {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerometerAngles {
    /// Derives the angles from raw `[x, y, z]` axis counts.
    ///
    /// Assumes the sensor is mounted right side up: X is shifted by -180°
    /// and Y is folded into `(-180, 180]` around the 90° mark.
    pub fn from_raw(raw: [i32; 3]) -> Self {
        let [x, y, z] = raw;
        let x_angle = axis_angle(y, z) - 180.0;
        let y_angle = axis_angle(z, x);
        let y_angle = if y_angle > 90.0 {
            y_angle - 270.0
        } else {
            y_angle + 90.0
        };
        AccelerometerAngles {
            x: x_angle,
            y: y_angle,
            z: axis_angle(x, y),
        }
    }
}
