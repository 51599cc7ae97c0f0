// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Position telemetry
//!
//! Keeps the latest position received on the event bus and fans it out to
//! subscribers. Subscriptions are keyed by position type and period, callers
//! requesting the same pair share one notification channel.

pub mod error;
pub mod registry;
pub mod telemetry_core;

pub use error::{RegistryError, TelemetryError};
pub use registry::{NotificationPtr, PositionNotification, Release, SubscriptionId};
pub use telemetry_core::{Subscription, TelemetryCore};

use async_trait::async_trait;
use common::clock::{Clock, MonotonicClock};
use common::connection::ConnectionState;
use common::report::PositionReport;
use module_core::{EventKind, GnssPositionPtr, Module, ModuleCtx};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Shared access to a [`TelemetryCore`].
///
/// The [`TelemetryModule`] feeds the core from the event bus while the
/// request side (subscribe, unsubscribe, position) goes through clones of
/// the same handle. Every call holds the lock only for its own duration, so
/// a release can never interleave with a dispatch in progress.
pub struct TelemetryHandle<C: Clock = MonotonicClock> {
    core: Arc<Mutex<TelemetryCore<C>>>,
}

impl<C: Clock> Clone for TelemetryHandle<C> {
    fn clone(&self) -> Self {
        TelemetryHandle {
            core: self.core.clone(),
        }
    }
}

impl TelemetryHandle<MonotonicClock> {
    pub fn new() -> Self {
        Self::from_core(TelemetryCore::new())
    }
}

impl Default for TelemetryHandle<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TelemetryHandle<C> {
    pub fn from_core(core: TelemetryCore<C>) -> Self {
        TelemetryHandle {
            core: Arc::new(Mutex::new(core)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TelemetryCore<C>> {
        self.core.lock().unwrap_or_else(|core| core.into_inner())
    }

    pub fn subscribe(
        &self,
        type_name: Option<&str>,
        period: Option<&str>,
    ) -> Result<Subscription, TelemetryError> {
        self.lock().subscribe(type_name, period)
    }

    pub fn unsubscribe(&self, id: Option<&str>) -> Result<Release, TelemetryError> {
        self.lock().unsubscribe(id)
    }

    pub fn position(&self, type_name: Option<&str>) -> Result<PositionReport, TelemetryError> {
        self.lock().position(type_name)
    }

    pub fn update_position(&self, position: GnssPositionPtr) -> usize {
        self.lock().update_position(position)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.lock().connection_state()
    }

    fn set_connection_state(&self, state: ConnectionState) {
        self.lock().set_connection_state(state)
    }

    /// Number of live subscription entries.
    pub fn subscriptions(&self) -> usize {
        self.lock().registry().len()
    }
}

/// Module feeding a [`TelemetryHandle`] from the event bus.
///
/// Every [`EventKind::GnssPositionEvent`] replaces the latest position and
/// dispatches the due subscriptions, in the order the samples were published.
pub struct TelemetryModule<C: Clock = MonotonicClock> {
    ctx: ModuleCtx,
    telemetry: TelemetryHandle<C>,
}

impl<C: Clock> TelemetryModule<C> {
    pub fn new(ctx: ModuleCtx, telemetry: TelemetryHandle<C>) -> Self {
        TelemetryModule { ctx, telemetry }
    }

    fn on_position(&self, position: GnssPositionPtr) {
        self.telemetry.update_position(position);
    }

    fn on_connection_state(&self, state: ConnectionState) {
        if state == ConnectionState::Disconnected {
            info!("Position source disconnected, keeping subscriptions registered");
        }
        self.telemetry.set_connection_state(state);
    }
}

#[async_trait]
impl<C: Clock + 'static> Module for TelemetryModule<C> {
    async fn run(&mut self) -> Result<(), ()> {
        let mut run = true;
        while run {
            tokio::select! {
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => match event.kind {
                            EventKind::QuitEvent => run = false,
                            EventKind::GnssPositionEvent(position) => {
                                self.on_position(position);
                            }
                            EventKind::ConnectionStateEvent(state) => {
                                debug!("Connection state {state} received in Telemetry module");
                                self.on_connection_state(state);
                            }
                        },
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Telemetry module lagged behind, {skipped} events lost");
                        }
                        Err(e) => {
                            error!("Failed to receive event in module Telemetry. Error: {e}");
                            run = false;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
