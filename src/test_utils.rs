//! Shared test utilities for the ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test accounts and transactions with sensible defaults.

use crate::{
    clock::{Clock, ManualClock},
    config::{AppConfig, settings::LedgerSettings},
    context::LedgerContext,
    core::{account, identity::Caller, tier::TierCatalog},
    entities::{self, Role, TransactionStatus, TransactionType},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a money literal such as `"10.30"`.
#[allow(clippy::unwrap_used)]
pub fn money(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// Fixed instant every test starts from.
#[allow(clippy::unwrap_used)]
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap()
}

/// Sets up a ledger context over a fresh database, the standard tiers and
/// default settings. The returned clock starts at [`test_time`] and drives
/// every timestamp the context produces.
pub async fn setup_test_context() -> Result<(LedgerContext, Arc<ManualClock>)> {
    let db = setup_test_db().await?;
    let clock = Arc::new(ManualClock::new(test_time()));
    let config = AppConfig {
        settings: LedgerSettings::default(),
        catalog: TierCatalog::standard(),
    };
    let shared: Arc<dyn Clock> = Arc::<ManualClock>::clone(&clock);
    Ok((LedgerContext::with_clock(db, config, shared), clock))
}

/// An account that was never stored, for the pure rules.
///
/// # Defaults
/// * `username`: the id
/// * `role`: USER, not banned, no warning, no running cycle
/// * `version`: 0
pub fn account_snapshot(id: &str, balance: Decimal, tier: Option<i32>) -> entities::account::Model {
    entities::account::Model {
        id: id.to_string(),
        username: id.to_string(),
        email: format!("{id}@example.com"),
        wallet_balance: balance,
        active_tier_id: tier,
        mining_timer_start: None,
        is_banned: false,
        warning: None,
        role: Role::User,
        created_at: test_time(),
        version: 0,
    }
}

/// A pending transaction that was never stored, for the pure rules.
pub fn transaction_snapshot(
    id: i64,
    account_id: &str,
    amount: Decimal,
    kind: TransactionType,
) -> entities::transaction::Model {
    entities::transaction::Model {
        id,
        account_id: account_id.to_string(),
        amount,
        kind,
        status: TransactionStatus::Pending,
        date: test_time(),
        method: Some("main".to_string()),
        receipt_url: None,
        description: None,
        decided_by: None,
        decided_at: None,
    }
}

/// Registers an account with zero balance.
pub async fn create_test_account(
    db: &DatabaseConnection,
    id: &str,
) -> Result<entities::account::Model> {
    account::register_account(db, id, id, &format!("{id}@example.com"), test_time()).await
}

/// Registers an account and sets its balance.
pub async fn create_funded_account(
    db: &DatabaseConnection,
    id: &str,
    balance: Decimal,
) -> Result<entities::account::Model> {
    create_test_account(db, id).await?;
    account::set_balance(db, id, balance).await
}

/// Provisions an admin account and returns it as a caller.
pub async fn create_test_admin(db: &DatabaseConnection, id: &str) -> Result<Caller> {
    let admin = account::provision_admin(db, id, test_time()).await?;
    Ok(Caller::from(&admin))
}

/// Stores a support chat message from the account owner.
pub async fn create_test_chat_message(
    db: &DatabaseConnection,
    account_id: &str,
    body: &str,
) -> Result<entities::chat_message::Model> {
    let message = entities::chat_message::ActiveModel {
        account_id: Set(account_id.to_string()),
        sender_name: Set(account_id.to_string()),
        body: Set(body.to_string()),
        is_admin: Set(false),
        sent_at: Set(test_time()),
        ..Default::default()
    };
    message.insert(db).await.map_err(Into::into)
}
