// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Line oriented NMEA 0183 decoding.
//!
//! [`NmeaParser`] turns single sentences into position samples and
//! [`NmeaCodec`] frames a byte stream into sentences, buffering partial
//! lines across reads.

use crate::error::StreamError;
use bytes::BytesMut;
use chrono::{NaiveDate, NaiveTime};
use common::position::{GnssPosition, KNOTS_TO_MPS};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};
use tracing::{debug, trace, warn};

/// Longest line accepted from the stream. gpsd JSON reports are far longer
/// than the 82 characters NMEA allows, so the bound is generous.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Parses NMEA sentences into [`GnssPosition`] samples.
///
/// A sample is completed by every valid `RMC` sentence. The altitude of the
/// last `GGA` sentence with a fix is attached to it.
#[derive(Debug, Default)]
pub struct NmeaParser {
    altitude: Option<f64>,
}

impl NmeaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one line of the stream.
    ///
    /// Returns `Some` when the line completes a new position sample. Lines
    /// that aren't NMEA sentences, carry a wrong checksum or can't be parsed
    /// are skipped.
    pub fn parse_line(&mut self, line: &str) -> Option<GnssPosition> {
        let line = line.trim();
        let Some(sentence) = line.strip_prefix('$') else {
            trace!("Ignoring non NMEA line {line}");
            return None;
        };
        let body = match sentence.split_once('*') {
            Some((body, checksum)) => {
                if !checksum_matches(body, checksum) {
                    debug!("Dropping sentence with bad checksum: {line}");
                    return None;
                }
                body
            }
            None => sentence,
        };
        let fields: Vec<&str> = body.split(',').collect();
        match fields[0].get(2..) {
            Some("GGA") => {
                self.parse_gga(&fields);
                None
            }
            Some("RMC") => self.parse_rmc(&fields),
            _ => None,
        }
    }

    fn parse_gga(&mut self, fields: &[&str]) {
        if fields.len() < 10 {
            return;
        }
        if fields[6].is_empty() || fields[6] == "0" {
            self.altitude = None;
            return;
        }
        self.altitude = fields[9].parse().ok();
    }

    fn parse_rmc(&self, fields: &[&str]) -> Option<GnssPosition> {
        if fields.len() < 10 || fields[2] != "A" {
            return None;
        }
        let time = parse_time(fields[1])?;
        let latitude = parse_coordinate(fields[3], fields[4])?;
        let longitude = parse_coordinate(fields[5], fields[6])?;
        let speed = fields[7].parse::<f64>().unwrap_or_default() * KNOTS_TO_MPS;
        let date = NaiveDate::parse_from_str(fields[9], "%d%m%y").ok()?;

        let mut position = GnssPosition::new(latitude, longitude, speed, &time, &date);
        if let Ok(track) = fields[8].parse::<f64>() {
            position = position.with_track(track);
        }
        if let Some(altitude) = self.altitude {
            position = position.with_altitude(altitude);
        }
        Some(position)
    }
}

/// Verifies the `*hh` checksum: the XOR of all bytes between `$` and `*`.
fn checksum_matches(body: &str, checksum: &str) -> bool {
    let Ok(expected) = u8::from_str_radix(checksum.trim(), 16) else {
        return false;
    };
    body.bytes().fold(0u8, |acc, byte| acc ^ byte) == expected
}

/// Parses a `(d)ddmm.mmmm` coordinate with its hemisphere into signed decimal degrees.
fn parse_coordinate(value: &str, hemisphere: &str) -> Option<f64> {
    // Byte offsets below are only char boundaries for ASCII input.
    if !value.is_ascii() {
        return None;
    }
    let dot = value.find('.').unwrap_or(value.len());
    if dot < 3 {
        return None;
    }
    let (degrees, minutes) = value.split_at(dot - 2);
    let degrees = degrees.parse::<f64>().ok()?;
    let minutes = minutes.parse::<f64>().ok()?;
    let decimal = degrees + minutes / 60.0;
    match hemisphere {
        "N" | "E" => Some(decimal),
        "S" | "W" => Some(-decimal),
        _ => None,
    }
}

/// Parses a `hhmmss[.sss]` UTC time.
fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H%M%S%.f").ok()
}

/// Decodes a byte stream into position samples.
///
/// Lines are framed by a bounded [`LinesCodec`]; a fragment without a
/// terminating newline stays buffered until the rest arrives with a later
/// read. When the stream ends, an unterminated trailing fragment is dropped.
#[derive(Debug)]
pub struct NmeaCodec {
    lines: LinesCodec,
    parser: NmeaParser,
}

impl NmeaCodec {
    pub fn new() -> Self {
        NmeaCodec {
            lines: LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            parser: NmeaParser::new(),
        }
    }
}

impl Default for NmeaCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NmeaCodec {
    type Item = GnssPosition;
    type Error = StreamError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<GnssPosition>, StreamError> {
        loop {
            match self.lines.decode(buf) {
                Ok(Some(line)) => {
                    if let Some(position) = self.parser.parse_line(&line) {
                        return Ok(Some(position));
                    }
                }
                Ok(None) => return Ok(None),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!("Discarding line longer than {MAX_LINE_LENGTH} bytes");
                }
                // Framing never reads, an I/O error here is a line that isn't UTF-8.
                Err(LinesCodecError::Io(e)) => debug!("Discarding undecodable line: {e}"),
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<GnssPosition>, StreamError> {
        let position = self.decode(buf)?;
        if position.is_none() && !buf.is_empty() {
            debug!("Dropping {} bytes of unterminated sentence", buf.len());
            buf.clear();
            self.lines = LinesCodec::new_with_max_length(MAX_LINE_LENGTH);
        }
        Ok(position)
    }
}
