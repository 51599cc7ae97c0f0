// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Common Modul for the telemetry service
//!
//! Provides the data types that are shared between the stream connection,
//! the subscription registry and the daemon.

pub mod clock;
pub mod connection;
pub mod orientation;
pub mod position;
pub mod position_type;
pub mod report;
pub mod test_helper;
