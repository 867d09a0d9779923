//! Shared state handed to every ledger operation.

use crate::{
    clock::{Clock, SystemClock},
    config::{AppConfig, settings::LedgerSettings},
    core::tier::TierCatalog,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Database connection, clock, tier catalog and settings.
#[derive(Debug)]
pub struct LedgerContext {
    /// Database connection for all store operations
    pub db: DatabaseConnection,
    /// Source of `now` for timestamps and cycle state
    pub clock: Arc<dyn Clock>,
    /// Purchasable tiers
    pub catalog: TierCatalog,
    /// Withdrawal floor and cycle length
    pub settings: LedgerSettings,
}

impl LedgerContext {
    /// Creates a context backed by the system clock.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// Creates a context with an explicit clock.
    #[must_use]
    pub fn with_clock(db: DatabaseConnection, config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            catalog: config.catalog,
            settings: config.settings,
        }
    }
}
