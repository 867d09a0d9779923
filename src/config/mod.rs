//! Configuration management: database connection, ledger settings, tier
//! catalog and admin provisioning.
//!
//! Settings and tiers come from an optional `config.toml`; connection details
//! and admin ids come from the environment (usually via `.env`).

/// Administrator ids from the environment
pub mod admins;

/// Database configuration and connection management
pub mod database;

/// Withdrawal floor and mining cycle length
pub mod settings;

/// Tier catalog loading from config.toml
pub mod tiers;

use crate::core::tier::TierCatalog;
use crate::errors::{Error, Result};
use serde::Deserialize;
use settings::{LedgerSection, LedgerSettings};
use std::path::Path;
use tiers::TierConfig;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// `[ledger]` table
    #[serde(default)]
    pub ledger: LedgerSection,
    /// `[[tiers]]` array
    #[serde(default)]
    pub tiers: Vec<TierConfig>,
}

/// Validated configuration ready to build a ledger context from.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Withdrawal floor and cycle length
    pub settings: LedgerSettings,
    /// Purchasable tiers
    pub catalog: TierCatalog,
}

impl Config {
    /// Validates every section and resolves defaults.
    pub fn resolve(self) -> Result<AppConfig> {
        Ok(AppConfig {
            settings: self.ledger.into_settings()?,
            catalog: tiers::build_catalog(self.tiers)?,
        })
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    debug!("Loading configuration from {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads and resolves `./config.toml`, falling back to built-in defaults when
/// the file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    if !path.exists() {
        warn!("config.toml not found, using built-in ledger defaults");
        return Config::default().resolve();
    }
    load_config(path)?.resolve()
}
