//! Wall-clock source for everything time-dependent in the ledger.
//!
//! Mining cycle state is derived from `now()` on every observation, so tests
//! inject a [`ManualClock`] instead of sleeping.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{PoisonError, RwLock};

/// Source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Moves the clock forward (or backward, for negative deltas).
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
