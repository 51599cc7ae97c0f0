use crate::error::TelemetryError;
use crate::registry::{
    DEFAULT_PERIOD_MS, NotificationPtr, Release, SubscriptionId, SubscriptionRegistry,
};
use common::clock::{Clock, MonotonicClock};
use common::connection::ConnectionState;
use common::position_type::PositionType;
use common::report::PositionReport;
use module_core::GnssPositionPtr;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, error, info};

/// Handed out by a successful subscribe.
#[derive(Debug)]
pub struct Subscription {
    /// Type name of the entry.
    pub name: &'static str,
    pub id: SubscriptionId,
    /// Receives the notifications of the entry.
    pub receiver: Receiver<NotificationPtr>,
}

/// Composition of the type table, the subscription registry and the latest
/// known position.
///
/// The core is driven by the position samples fed through
/// [`update_position`](TelemetryCore::update_position). Requests from
/// callers arrive as string parameters and are validated here.
pub struct TelemetryCore<C: Clock = MonotonicClock> {
    registry: SubscriptionRegistry,
    latest: Option<GnssPositionPtr>,
    connection: ConnectionState,
    clock: C,
}

impl TelemetryCore<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for TelemetryCore<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TelemetryCore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_registry(SubscriptionRegistry::new(), clock)
    }

    pub fn with_registry(registry: SubscriptionRegistry, clock: C) -> Self {
        TelemetryCore {
            registry,
            latest: None,
            connection: ConnectionState::Disconnected,
            clock,
        }
    }

    /// Subscribes to position notifications.
    ///
    /// `type_name` defaults to [`PositionType::DEFAULT`], `period` (in
    /// milliseconds) to [`DEFAULT_PERIOD_MS`]. Subscribing twice with the same
    /// parameters returns the same id.
    pub fn subscribe(
        &mut self,
        type_name: Option<&str>,
        period: Option<&str>,
    ) -> Result<Subscription, TelemetryError> {
        let position_type = PositionType::resolve(type_name)?;
        let period = parse_period(period)?;
        let entry = self
            .registry
            .get_or_create(position_type, period)
            .map_err(|e| {
                error!("Can't subscribe to {position_type} every {period:?}: {e}");
                e
            })?;
        info!(
            "Subscribed to {} every {:?} as {} ({} subscribers)",
            entry.name(),
            period,
            entry.id(),
            entry.subscribers()
        );
        Ok(Subscription {
            name: entry.name(),
            id: entry.id(),
            receiver: entry.receiver(),
        })
    }

    /// Releases one subscription reference to the entry with the given id.
    ///
    /// Ownership isn't tracked, any caller may release any id.
    pub fn unsubscribe(&mut self, id: Option<&str>) -> Result<Release, TelemetryError> {
        let id = id
            .and_then(|id| id.trim().parse::<SubscriptionId>().ok())
            .ok_or(TelemetryError::MissingId)?;
        let release = self.registry.release(id)?;
        info!("Unsubscribed from {id}: {release:?}");
        Ok(release)
    }

    /// The latest position rendered as `type_name`.
    pub fn position(&self, type_name: Option<&str>) -> Result<PositionReport, TelemetryError> {
        let position_type = PositionType::resolve(type_name)?;
        let latest = self.latest.as_ref().ok_or(TelemetryError::NoPosition)?;
        Ok(PositionReport::render(latest, position_type))
    }

    /// Stores `position` as the latest sample and notifies the due subscriptions.
    ///
    /// Returns the number of subscriptions that fired.
    pub fn update_position(&mut self, position: GnssPositionPtr) -> usize {
        let fired = self.registry.dispatch(&position, self.clock.now());
        debug!("Position update fired {fired} subscriptions");
        self.latest = Some(position);
        fired
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn set_connection_state(&mut self, state: ConnectionState) {
        self.connection = state;
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }
}

/// Parses a period in milliseconds. A missing period selects the default,
/// zero or anything that isn't a number is rejected.
fn parse_period(period: Option<&str>) -> Result<Duration, TelemetryError> {
    match period {
        None => Ok(Duration::from_millis(DEFAULT_PERIOD_MS)),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
            _ => Err(TelemetryError::InvalidPeriod(raw.to_string())),
        },
    }
}
