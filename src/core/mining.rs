//! Mining cycle engine.
//!
//! A cycle's state is never stored. It is recomputed from the account's
//! `mining_timer_start`, the current time and the cycle length every time it is
//! observed, so there is no scheduler and nothing to resume after a restart.

use crate::{
    entities::account,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Length of one mining cycle
pub const MINING_CYCLE_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Observed state of a mining cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleState {
    /// No cycle has been started
    Idle,
    /// A cycle is running
    Running {
        /// Time left until the cycle completes
        remaining: Duration,
    },
    /// The cycle has elapsed and the payout can be claimed
    Complete,
}

impl CycleState {
    /// Whether the payout can be claimed.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Derives the cycle state from a start timestamp.
///
/// A start time in the future (clock skew between writers) counts as running
/// with the full cycle plus the skew still ahead.
#[must_use]
pub fn cycle_state(start: Option<DateTime<Utc>>, now: DateTime<Utc>, duration: Duration) -> CycleState {
    let Some(start) = start else {
        return CycleState::Idle;
    };

    match (now - start).to_std() {
        Ok(elapsed) if elapsed >= duration => CycleState::Complete,
        Ok(elapsed) => CycleState::Running {
            remaining: duration - elapsed,
        },
        Err(_) => {
            let skew = (start - now).to_std().unwrap_or_default();
            CycleState::Running {
                remaining: duration.saturating_add(skew),
            }
        }
    }
}

/// Starts a cycle: IDLE → RUNNING.
///
/// Requires an active tier. A cycle that is running, or complete but not yet
/// claimed, cannot be restarted.
pub fn start_cycle(
    account: &account::Model,
    now: DateTime<Utc>,
    duration: Duration,
) -> Result<account::Model> {
    if account.active_tier_id.is_none() {
        return Err(Error::NoActiveTier);
    }

    if cycle_state(account.mining_timer_start, now, duration) != CycleState::Idle {
        return Err(Error::CycleAlreadyStarted);
    }

    let mut updated = account.clone();
    updated.mining_timer_start = Some(now);
    Ok(updated)
}
