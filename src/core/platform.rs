//! Global platform configuration.
//!
//! The withdrawal maintenance flag, the announcement banner and the deposit
//! addresses live in one singleton row plus a table of named deposit channels.
//! The row is created with defaults the first time it is read. Every update
//! bumps `version`.

use crate::{
    entities::{DepositChannel, PlatformConfig, deposit_channel, platform_config},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Primary key of the singleton configuration row
pub const PLATFORM_CONFIG_ID: i32 = 1;

/// Deposit method naming the main deposit address
pub const MAIN_CHANNEL: &str = "main";

/// The configuration row together with its deposit channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSnapshot {
    /// The singleton configuration row
    pub config: platform_config::Model,
    /// Named deposit channels, sorted by name
    pub channels: Vec<deposit_channel::Model>,
}

impl PlatformSnapshot {
    /// Checks that `method` names a channel users may deposit through.
    ///
    /// With no channels configured any method is accepted. Otherwise the method
    /// must be [`MAIN_CHANNEL`] or the name of a configured channel.
    pub fn validate_deposit_method(&self, method: &str) -> Result<()> {
        if self.channels.is_empty()
            || method == MAIN_CHANNEL
            || self.channels.iter().any(|channel| channel.name == method)
        {
            return Ok(());
        }
        Err(Error::UnknownDepositChannel {
            channel: method.to_string(),
        })
    }
}

/// Reads the configuration row, inserting the defaults when it is missing.
pub async fn get_platform_config<C>(db: &C, now: DateTime<Utc>) -> Result<platform_config::Model>
where
    C: ConnectionTrait,
{
    if let Some(config) = PlatformConfig::find_by_id(PLATFORM_CONFIG_ID).one(db).await? {
        return Ok(config);
    }

    let defaults = platform_config::ActiveModel {
        id: Set(PLATFORM_CONFIG_ID),
        withdrawals_paused: Set(false),
        announcement: Set(None),
        main_deposit_address: Set(String::new()),
        version: Set(0),
        updated_at: Set(now),
    };
    let created = defaults.insert(db).await?;
    info!("Created default platform configuration");
    Ok(created)
}

/// Lists deposit channels sorted by name.
pub async fn list_deposit_channels<C>(db: &C) -> Result<Vec<deposit_channel::Model>>
where
    C: ConnectionTrait,
{
    DepositChannel::find()
        .order_by_asc(deposit_channel::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads the configuration row and its channels.
pub async fn load_platform<C>(db: &C, now: DateTime<Utc>) -> Result<PlatformSnapshot>
where
    C: ConnectionTrait,
{
    let config = get_platform_config(db, now).await?;
    let channels = list_deposit_channels(db).await?;
    debug!(
        "Loaded platform configuration v{} with {} deposit channels",
        config.version,
        channels.len()
    );
    Ok(PlatformSnapshot { config, channels })
}

async fn update_config<C, F>(db: &C, now: DateTime<Utc>, apply: F) -> Result<platform_config::Model>
where
    C: ConnectionTrait,
    F: FnOnce(&mut platform_config::ActiveModel),
{
    let current = get_platform_config(db, now).await?;
    let version = current.version + 1;

    let mut active_model: platform_config::ActiveModel = current.into();
    apply(&mut active_model);
    active_model.version = Set(version);
    active_model.updated_at = Set(now);

    active_model.update(db).await.map_err(Into::into)
}

/// Pauses or resumes withdrawal requests.
#[instrument(skip(db))]
pub async fn set_withdrawals_paused<C>(
    db: &C,
    paused: bool,
    now: DateTime<Utc>,
) -> Result<platform_config::Model>
where
    C: ConnectionTrait,
{
    let updated = update_config(db, now, |config| {
        config.withdrawals_paused = Set(paused);
    })
    .await?;
    info!("Withdrawals paused: {paused}");
    Ok(updated)
}

/// Sets the announcement banner. Blank text clears it.
#[instrument(skip(db))]
pub async fn set_announcement<C>(
    db: &C,
    announcement: Option<&str>,
    now: DateTime<Utc>,
) -> Result<platform_config::Model>
where
    C: ConnectionTrait,
{
    let announcement = announcement
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string);
    let cleared = announcement.is_none();

    let updated = update_config(db, now, |config| {
        config.announcement = Set(announcement);
    })
    .await?;

    if cleared {
        info!("Announcement cleared");
    } else {
        info!("Announcement updated");
    }
    Ok(updated)
}

/// Replaces the main deposit address and the full set of named channels.
///
/// Channel names and addresses are trimmed. Blank or duplicate names, and
/// blank addresses, are rejected before anything is written.
#[instrument(skip(db, channels))]
pub async fn set_deposit_addresses(
    db: &DatabaseConnection,
    main_address: &str,
    channels: Vec<(String, String)>,
    now: DateTime<Utc>,
) -> Result<PlatformSnapshot> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(channels.len());
    for (name, address) in channels {
        let name = name.trim().to_string();
        let address = address.trim().to_string();
        if name.is_empty() || address.is_empty() {
            return Err(Error::Config {
                message: "Deposit channel name and address cannot be empty".to_string(),
            });
        }
        if name == MAIN_CHANNEL || !seen.insert(name.clone()) {
            return Err(Error::Config {
                message: format!("Duplicate deposit channel '{name}'"),
            });
        }
        cleaned.push((name, address));
    }

    let main_address = main_address.trim().to_string();
    let txn = db.begin().await?;

    DepositChannel::delete_many().exec(&txn).await?;
    for (name, address) in cleaned {
        deposit_channel::ActiveModel {
            name: Set(name),
            address: Set(address),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    update_config(&txn, now, |config| {
        config.main_deposit_address = Set(main_address);
    })
    .await?;

    let snapshot = load_platform(&txn, now).await?;
    txn.commit().await?;

    info!(
        "Deposit addresses updated: {} channels, config v{}",
        snapshot.channels.len(),
        snapshot.config.version
    );
    Ok(snapshot)
}
