// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Position stream connection
//!
//! Connects to an NMEA or gpsd position source over TCP, decodes the
//! sentences into position samples and publishes them on the event bus.
//! The connection is re-established with a growing delay whenever it fails.

pub mod backoff;
pub mod config;
pub mod connection;
pub mod error;
pub mod nmea;
pub mod service;
pub mod stream_source;

pub use config::StreamConfig;
pub use error::{ConnectError, StreamError};
pub use stream_source::NmeaStreamModule;

#[cfg(test)]
mod tests;
