use common::connection::ConnectionState;
use strum_macros::EnumDiscriminants;
use tokio::sync::broadcast::{self, error::SendError};

/// Message exchanged between the modules of the telemetry service.
///
/// The payload is the wrapped [`EventKind`]; events travel over the
/// [`EventBus`] and are cloned for every receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
}

impl Event {
    /// Returns the discriminant of the wrapped [`EventKind`].
    pub fn event_type(&self) -> EventKindType {
        EventKindType::from(&self.kind)
    }
}

/// A thread-safe, reference-counted pointer to a [`GnssPosition`](common::position::GnssPosition).
///
/// Every position sample is shared between all modules listening on the bus
/// without copying it.
pub type GnssPositionPtr = std::sync::Arc<common::position::GnssPosition>;

/// Everything that can be published on the [`EventBus`].
///
/// The payload-free discriminants are available as [`EventKindType`].
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKindType), derive(Hash))]
pub enum EventKind {
    /// Every module stops its run loop.
    QuitEvent,

    /// A complete position sample parsed from the position stream.
    ///
    /// Samples are published in the order they were received on the wire.
    GnssPositionEvent(GnssPositionPtr),

    /// The stream connection changed its lifecycle state.
    ConnectionStateEvent(ConnectionState),
}

/// Returns a reference to the payload of an [`EventKind`] variant.
///
/// Evaluates to `Some(&payload)` when `$kind` is the given variant and to
/// `None` otherwise.
///
/// ```rust
/// use module_core::{EventKind, payload_ref};
/// use common::connection::ConnectionState;
///
/// let kind = EventKind::ConnectionStateEvent(ConnectionState::Connected);
/// assert_eq!(
///     payload_ref!(kind, EventKind::ConnectionStateEvent),
///     Some(&ConnectionState::Connected)
/// );
/// ```
#[macro_export]
macro_rules! payload_ref {
    ($kind:expr, $variant:path) => {
        match &$kind {
            $variant(payload) => Some(payload),
            _ => None,
        }
    };
}

/// Fan-out channel connecting the modules.
///
/// Backed by a [`tokio::sync::broadcast::channel`]: every receiver sees every
/// event published after it subscribed. Events published while nobody
/// listens are dropped.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Buffer capacity of the bus. When the buffer is full, the oldest
    /// messages are dropped for lagging receivers.
    pub const CAPACITY: usize = 100;

    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        EventBus { sender }
    }

    /// New receiver for the events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Sends a copy of `event` to every receiver.
    pub fn publish(&self, event: &Event) {
        let _ = self.sender.send(event.clone());
    }

    /// Sender and receiver pair for a module running on this bus.
    pub fn context(&self) -> ModuleCtx {
        ModuleCtx::new(self)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of the service driven by the events of the [`EventBus`].
#[async_trait::async_trait]
pub trait Module {
    /// Runs the module asynchronously until a [`EventKind::QuitEvent`] is received.
    async fn run(&mut self) -> Result<(), ()>;
}

/// The connection of one module to the [`EventBus`].
pub struct ModuleCtx {
    pub sender: broadcast::Sender<Event>,
    pub receiver: broadcast::Receiver<Event>,
}

impl ModuleCtx {
    pub fn new(event_bus: &EventBus) -> Self {
        ModuleCtx {
            sender: event_bus.sender.clone(),
            receiver: event_bus.subscribe(),
        }
    }

    /// Publishes an event of the given kind on the bus.
    ///
    /// Returns the number of receivers the event was delivered to, or an
    /// error when nobody listens.
    pub fn publish_event(&self, kind: EventKind) -> Result<usize, SendError<Event>> {
        self.sender.send(Event { kind })
    }
}

pub mod test_helper;
