//! Wall-clock sources.
//!
//! The timer never measures time with a monotonic counter: it stores
//! absolute instants and recomputes elapsed time from them, which is what
//! lets a run survive process suspension and restarts. The price is that
//! the clock may jump (user edits, NTP corrections), so every consumer must
//! clamp negative deltas.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// A source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can hand one clone to the
/// engine and keep another to advance time, simulate a suspended process,
/// or wind the clock backwards.
///
/// ```rust
/// use bookking::libs::clock::{Clock, ManualClock};
/// use chrono::Duration;
///
/// let clock = ManualClock::at_millis(0);
/// let engine_clock = clock.clone();
/// clock.advance(Duration::seconds(65));
/// assert_eq!(engine_clock.now().timestamp(), 65);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Starts the clock at the given epoch milliseconds.
    pub fn at_millis(millis: i64) -> Self {
        Self::new(DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    /// Moves the clock by `delta`, which may be negative.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
