use crate::{Event, EventBus, EventKind, EventKindType};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, timeout};
use tracing::debug;

/// Sends a quit signal to a running module and waits for it to stop gracefully.
///
/// This function publishes a [`QuitEvent`](EventKind::QuitEvent) through the given [`EventBus`]
/// and waits up to 100ms for the module's task to complete.
///
/// # Panics
/// This function panics if:
/// - The module does not stop within the timeout.
/// - The task panicked or returned an error (`Err(())`).
pub async fn stop_module(
    event_bus: &EventBus,
    handle: &mut tokio::task::JoinHandle<Result<(), ()>>,
) {
    event_bus.publish(&Event {
        kind: EventKind::QuitEvent,
    });
    timeout(std::time::Duration::from_millis(100), handle)
        .await
        .expect("Module doesn't handle quit event in timeout")
        .expect("Module task panicked")
        .expect("Module returned an error");
}

/// Waits for an [`Event`] of type `exp_event` on `rx`.
///
/// Events of other types are skipped. A lagging receiver skips the lost
/// events and keeps waiting.
///
/// # Panics
///
/// Panics if no matching event is received within `duration` or the bus is closed.
pub async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    duration: std::time::Duration,
    exp_event: EventKindType,
) -> Event {
    let deadline = Instant::now() + duration;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, rx.recv()).await {
            Ok(Ok(event)) if event.event_type() == exp_event => return event,
            Ok(Ok(event)) => debug!("Skipping event {:?}", event.event_type()),
            Ok(Err(RecvError::Lagged(skipped))) => debug!("Receiver lagged by {skipped} events"),
            Ok(Err(RecvError::Closed)) => panic!("Event bus closed while waiting for {exp_event:?}"),
            Err(_) => panic!("Failed to receive event of type {exp_event:?}"),
        }
    }
}
