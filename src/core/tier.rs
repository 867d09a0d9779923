//! Tier catalog - the ordered list of purchasable VIP levels.
//!
//! Tiers are static configuration, not user data. The catalog is totally
//! ordered by `id`; upgrades may only move to a strictly higher id.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable subscription level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Ordinal rank, also the upgrade ordering key
    pub id: i32,
    /// Display name
    pub name: String,
    /// One-time activation cost
    pub price: Decimal,
    /// Payout per completed mining cycle
    pub daily_return: Decimal,
}

/// Validated, id-ordered set of tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    /// Builds a catalog, sorting by id.
    ///
    /// Fails when the list is empty, when ids repeat or are not positive, or
    /// when a price or return is not a sensible amount.
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(Error::Config {
                message: "Tier catalog cannot be empty".to_string(),
            });
        }

        tiers.sort_by_key(|tier| tier.id);

        for pair in tiers.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(Error::Config {
                    message: format!("Duplicate tier id {}", pair[0].id),
                });
            }
        }

        for tier in &tiers {
            if tier.id <= 0 {
                return Err(Error::Config {
                    message: format!("Tier id must be positive, got {}", tier.id),
                });
            }
            if tier.price <= Decimal::ZERO {
                return Err(Error::Config {
                    message: format!("Tier {} has invalid price {}", tier.id, tier.price),
                });
            }
            if tier.daily_return < Decimal::ZERO {
                return Err(Error::Config {
                    message: format!(
                        "Tier {} has invalid daily return {}",
                        tier.id, tier.daily_return
                    ),
                });
            }
        }

        Ok(Self { tiers })
    }

    /// The nine standard VIP levels.
    #[must_use]
    pub fn standard() -> Self {
        // (id, price, daily return in cents)
        let levels = [
            (1, 25, 150),
            (2, 50, 320),
            (3, 75, 500),
            (4, 100, 750),
            (5, 150, 1200),
            (6, 200, 1800),
            (7, 300, 2800),
            (8, 400, 3800),
            (9, 500, 5000),
        ];

        Self {
            tiers: levels
                .into_iter()
                .map(|(id, price, daily_return)| Tier {
                    id,
                    name: format!("VIP {id}"),
                    price: Decimal::new(price, 0),
                    daily_return: Decimal::new(daily_return, 2),
                })
                .collect(),
        }
    }

    /// Looks up a tier by id.
    #[must_use]
    pub fn get(&self, id: i32) -> Option<&Tier> {
        self.tiers
            .binary_search_by_key(&id, |tier| tier.id)
            .ok()
            .map(|index| &self.tiers[index])
    }

    /// Looks up a tier by id, failing with `TierNotFound`.
    pub fn require(&self, id: i32) -> Result<&Tier> {
        self.get(id).ok_or(Error::TierNotFound { id })
    }

    /// All tiers, lowest first.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Tiers an account holding `current` may still buy.
    #[must_use]
    pub fn upgrades_from(&self, current: Option<i32>) -> &[Tier] {
        let floor = current.unwrap_or(0);
        let start = self.tiers.partition_point(|tier| tier.id <= floor);
        &self.tiers[start..]
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
