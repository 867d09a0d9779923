//! Tier catalog loading from config.toml
//!
//! The `[[tiers]]` array replaces the built-in VIP levels when present.

use crate::core::tier::{Tier, TierCatalog};
use crate::errors::Result;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Configuration for a single tier
#[derive(Debug, Deserialize, Clone)]
pub struct TierConfig {
    /// Ordinal rank
    pub id: i32,
    /// Display name, defaults to `"VIP <id>"`
    #[serde(default)]
    pub name: Option<String>,
    /// One-time activation cost
    pub price: Decimal,
    /// Payout per completed mining cycle
    pub daily_return: Decimal,
}

impl From<TierConfig> for Tier {
    fn from(config: TierConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.unwrap_or_else(|| format!("VIP {}", config.id)),
            price: config.price,
            daily_return: config.daily_return,
        }
    }
}

/// Builds the catalog from configured tiers, or the standard catalog when none
/// are configured.
pub fn build_catalog(configs: Vec<TierConfig>) -> Result<TierCatalog> {
    if configs.is_empty() {
        return Ok(TierCatalog::standard());
    }
    TierCatalog::new(configs.into_iter().map(Tier::from).collect())
}
