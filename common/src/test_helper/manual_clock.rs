use crate::clock::Clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A [`Clock`] whose reading is moved forward explicitly by the test.
///
/// Clones share the same reading, so a test can keep one clone and hand
/// the other to the component under test.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the reading forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
