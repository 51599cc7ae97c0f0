use std::time::{Duration, Instant};

/// A monotonic time source used to pace subscription notifications.
///
/// [`now`](Clock::now) returns the time elapsed since an arbitrary but fixed
/// origin. Only differences between two readings are meaningful. The reading
/// must never go backwards, system clock adjustments must not affect it.
pub trait Clock: Send {
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`], with the origin at construction time.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
