//! Account store - registration, lookups, snapshot writes and admin edits.
//!
//! Every write bumps `version`. Reconciliation writes are conditional on the
//! version they read ([`write_snapshot`]), so an account that changed between
//! read and write is reported as `StaleAccount` instead of being overwritten.
//! Admin edits are unconditional (last write wins) but still bump the version.

use crate::{
    entities::{Account, ChatMessage, Role, account, chat_message},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// Counts removed by an account purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Ledger rows deleted
    pub transactions_removed: u64,
    /// Chat messages deleted
    pub messages_removed: u64,
}

/// Creates a new account with zero balance, no tier and no running cycle.
///
/// The id comes from the identity provider; the username must not be blank.
#[instrument(skip(db))]
pub async fn register_account<C>(
    db: &C,
    id: &str,
    username: &str,
    email: &str,
    now: DateTime<Utc>,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    if id.trim().is_empty() {
        return Err(Error::Config {
            message: "Account id cannot be empty".to_string(),
        });
    }
    if username.trim().is_empty() {
        return Err(Error::Config {
            message: "Username cannot be empty".to_string(),
        });
    }

    let account = account::ActiveModel {
        id: Set(id.trim().to_string()),
        username: Set(username.trim().to_string()),
        email: Set(email.trim().to_string()),
        wallet_balance: Set(Decimal::ZERO),
        active_tier_id: Set(None),
        mining_timer_start: Set(None),
        is_banned: Set(false),
        warning: Set(None),
        role: Set(Role::User),
        created_at: Set(now),
        version: Set(0),
    };

    let created = account.insert(db).await?;
    info!("Registered account {}", created.id);
    Ok(created)
}

/// Finds an account by id.
pub async fn get_account<C>(db: &C, id: &str) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by id, failing with `AccountNotFound`.
pub async fn require_account<C>(db: &C, id: &str) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    get_account(db, id)
        .await?
        .ok_or_else(|| Error::AccountNotFound { id: id.to_string() })
}

/// Lists every account, oldest registration first.
pub async fn list_accounts<C>(db: &C) -> Result<Vec<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .order_by_asc(account::Column::CreatedAt)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes the reconciled fields of `updated` if the stored row is still at
/// `previous.version`.
///
/// Only the fields the reconciliation rules own are written: balance, tier and
/// mining timer. Returns the stored snapshot with its new version.
pub async fn write_snapshot<C>(
    db: &C,
    previous: &account::Model,
    updated: &account::Model,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    if updated.wallet_balance < Decimal::ZERO {
        return Err(Error::InsufficientFunds {
            current: previous.wallet_balance,
            required: previous.wallet_balance - updated.wallet_balance,
        });
    }

    let result = Account::update_many()
        .col_expr(
            account::Column::WalletBalance,
            Expr::value(updated.wallet_balance),
        )
        .col_expr(
            account::Column::ActiveTierId,
            Expr::value(updated.active_tier_id),
        )
        .col_expr(
            account::Column::MiningTimerStart,
            Expr::value(updated.mining_timer_start),
        )
        .col_expr(account::Column::Version, Expr::value(previous.version + 1))
        .filter(account::Column::Id.eq(previous.id.as_str()))
        .filter(account::Column::Version.eq(previous.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!(
            "Account {} changed since version {}, refusing to overwrite",
            previous.id, previous.version
        );
        return Err(Error::StaleAccount {
            id: previous.id.clone(),
        });
    }

    let mut stored = updated.clone();
    stored.version = previous.version + 1;
    Ok(stored)
}

async fn update_account_field<C>(
    db: &C,
    id: &str,
    column: account::Column,
    value: sea_orm::Value,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let result = Account::update_many()
        .col_expr(column, Expr::value(value))
        .col_expr(
            account::Column::Version,
            Expr::col(account::Column::Version).add(1),
        )
        .filter(account::Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::AccountNotFound { id: id.to_string() });
    }
    require_account(db, id).await
}

/// Overwrites the wallet balance with an arbitrary non-negative value.
#[instrument(skip(db))]
pub async fn set_balance<C>(db: &C, id: &str, balance: Decimal) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    if balance < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount: balance });
    }

    let updated = update_account_field(db, id, account::Column::WalletBalance, balance.into()).await?;
    info!("Balance of account {id} set to {balance:.2}");
    Ok(updated)
}

/// Sets the ban flag.
#[instrument(skip(db))]
pub async fn set_banned<C>(db: &C, id: &str, banned: bool) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let updated = update_account_field(db, id, account::Column::IsBanned, banned.into()).await?;
    info!("Account {id} banned = {banned}");
    Ok(updated)
}

/// Sets or clears the admin warning. Blank text clears it.
#[instrument(skip(db))]
pub async fn set_warning<C>(db: &C, id: &str, warning: Option<&str>) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let warning = warning
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string);
    let updated =
        update_account_field(db, id, account::Column::Warning, warning.clone().into()).await?;
    info!("Warning on account {id} set to {warning:?}");
    Ok(updated)
}

/// Promotes an account to ADMIN, creating it first if the identity provider
/// has not registered it here yet.
#[instrument(skip(db))]
pub async fn provision_admin<C>(db: &C, id: &str, now: DateTime<Utc>) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let existing = get_account(db, id).await?;
    if existing.as_ref().is_some_and(|account| account.role == Role::Admin) {
        return require_account(db, id).await;
    }
    if existing.is_none() {
        register_account(db, id, id, "", now).await?;
    }

    let updated = update_account_field(db, id, account::Column::Role, Role::Admin.into()).await?;
    info!("Provisioned account {id} as administrator");
    Ok(updated)
}

/// Permanently deletes an account together with its transactions and chat
/// history, all in one database transaction.
#[instrument(skip(db))]
pub async fn purge_account(db: &DatabaseConnection, id: &str) -> Result<PurgeSummary> {
    let txn = db.begin().await?;

    require_account(&txn, id).await?;

    let transactions_removed = crate::core::ledger::delete_for_account(&txn, id).await?;
    let messages_removed = ChatMessage::delete_many()
        .filter(chat_message::Column::AccountId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    Account::delete_by_id(id.to_string()).exec(&txn).await?;

    txn.commit().await?;

    info!(
        "Purged account {id}: {transactions_removed} transactions, {messages_removed} chat messages"
    );
    Ok(PurgeSummary {
        transactions_removed,
        messages_removed,
    })
}
