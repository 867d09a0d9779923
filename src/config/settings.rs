//! Ledger settings - withdrawal floor and mining cycle length.

use crate::core::mining::MINING_CYCLE_DURATION;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Smallest amount a user may request to withdraw
pub const MIN_WITHDRAWAL: Decimal = Decimal::TEN;

/// Resolved settings consumed by the self-service actions and mining engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSettings {
    /// Withdrawal floor
    pub min_withdrawal: Decimal,
    /// Length of one mining cycle
    pub mining_cycle: Duration,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            min_withdrawal: MIN_WITHDRAWAL,
            mining_cycle: MINING_CYCLE_DURATION,
        }
    }
}

/// The `[ledger]` table of config.toml. Every key is optional.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct LedgerSection {
    /// Overrides [`MIN_WITHDRAWAL`]
    pub min_withdrawal: Option<Decimal>,
    /// Overrides the 24 hour cycle
    pub mining_cycle_hours: Option<u64>,
}

impl LedgerSection {
    /// Validates the section and fills gaps with defaults.
    pub fn into_settings(self) -> Result<LedgerSettings> {
        let defaults = LedgerSettings::default();

        let min_withdrawal = self.min_withdrawal.unwrap_or(defaults.min_withdrawal);
        if min_withdrawal <= Decimal::ZERO {
            return Err(Error::Config {
                message: format!("min_withdrawal must be a positive number, got {min_withdrawal}"),
            });
        }

        let mining_cycle = match self.mining_cycle_hours {
            Some(0) => {
                return Err(Error::Config {
                    message: "mining_cycle_hours must be at least 1".to_string(),
                });
            }
            Some(hours) => Duration::from_secs(hours * 60 * 60),
            None => defaults.mining_cycle,
        };

        Ok(LedgerSettings {
            min_withdrawal,
            mining_cycle,
        })
    }
}
