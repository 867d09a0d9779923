//! Admin approval workflow and admin-only account management.
//!
//! Every operation here first checks that the caller is an admin. Decisions
//! re-read the transaction and its account inside one database transaction,
//! run the pure reconciliation rules on that fresh state, and write back with
//! conditional updates, so a decision either lands completely or not at all.

use crate::{
    context::LedgerContext,
    core::{
        account::{self as accounts, PurgeSummary},
        identity::Caller,
        ledger::{self, Settlement},
        platform::{self, PlatformSnapshot},
        reconcile,
        report::{self, PlatformStats},
    },
    entities::{Role, TransactionType, account, platform_config, transaction},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use tracing::{info, instrument, warn};

/// Outcome an admin picks for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Apply the request to the balance
    Approve,
    /// Decline the request, no balance effect
    Reject,
}

/// Approves or rejects a pending deposit or withdrawal.
///
/// A withdrawal the account can no longer cover fails with
/// `InsufficientFunds` and stays `PENDING`; it is never auto-rejected.
#[instrument(skip(ctx, admin), fields(admin = %admin.account_id))]
pub async fn decide(
    ctx: &LedgerContext,
    admin: &Caller,
    transaction_id: i64,
    decision: Decision,
) -> Result<Settlement> {
    admin.require_admin()?;
    let now = ctx.clock.now();

    let txn = ctx.db.begin().await?;

    let pending = ledger::get_transaction_by_id(&txn, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    let current = accounts::require_account(&txn, &pending.account_id).await?;

    let (account, mut decided) = match decision {
        Decision::Approve => {
            let (updated, decided) = reconcile::apply_approval(&pending, &current)
                .inspect_err(|e| warn!("Approval of transaction {transaction_id} refused: {e}"))?;
            let stored = accounts::write_snapshot(&txn, &current, &updated).await?;
            (stored, decided)
        }
        Decision::Reject => {
            let decided = reconcile::apply_rejection(&pending)
                .inspect_err(|e| warn!("Rejection of transaction {transaction_id} refused: {e}"))?;
            (current, decided)
        }
    };

    ledger::finalize_status(&txn, transaction_id, decided.status, &admin.account_id, now).await?;
    txn.commit().await?;

    decided.decided_by = Some(admin.account_id.clone());
    decided.decided_at = Some(now);

    info!(
        "Transaction {} ({:?}, {:.2}) for account {} is now {:?}; balance {:.2}",
        decided.id, decided.kind, decided.amount, account.id, decided.status, account.wallet_balance
    );
    Ok(Settlement {
        account,
        transaction: decided,
    })
}

/// Approves a pending deposit or withdrawal.
pub async fn approve(ctx: &LedgerContext, admin: &Caller, transaction_id: i64) -> Result<Settlement> {
    decide(ctx, admin, transaction_id, Decision::Approve).await
}

/// Rejects a pending deposit or withdrawal.
pub async fn reject(ctx: &LedgerContext, admin: &Caller, transaction_id: i64) -> Result<Settlement> {
    decide(ctx, admin, transaction_id, Decision::Reject).await
}

/// Pending deposits, oldest first.
pub async fn pending_deposits(ctx: &LedgerContext, admin: &Caller) -> Result<Vec<transaction::Model>> {
    admin.require_admin()?;
    ledger::list_pending(&ctx.db, Some(TransactionType::Deposit)).await
}

/// Pending withdrawals, oldest first.
pub async fn pending_withdrawals(
    ctx: &LedgerContext,
    admin: &Caller,
) -> Result<Vec<transaction::Model>> {
    admin.require_admin()?;
    ledger::list_pending(&ctx.db, Some(TransactionType::Withdrawal)).await
}

/// Every transaction on the platform, newest first.
pub async fn all_transactions(ctx: &LedgerContext, admin: &Caller) -> Result<Vec<transaction::Model>> {
    admin.require_admin()?;
    ledger::list_transactions(&ctx.db, None).await
}

/// Every registered account.
pub async fn all_accounts(ctx: &LedgerContext, admin: &Caller) -> Result<Vec<account::Model>> {
    admin.require_admin()?;
    accounts::list_accounts(&ctx.db).await
}

async fn require_unprotected(ctx: &LedgerContext, id: &str) -> Result<account::Model> {
    let target = accounts::require_account(&ctx.db, id).await?;
    if target.role == Role::Admin {
        warn!("Refused moderation action on admin account {id}");
        return Err(Error::ProtectedAccount { id: id.to_string() });
    }
    Ok(target)
}

/// Overwrites an account's balance.
#[instrument(skip(ctx, admin), fields(admin = %admin.account_id))]
pub async fn set_balance(
    ctx: &LedgerContext,
    admin: &Caller,
    account_id: &str,
    balance: Decimal,
) -> Result<account::Model> {
    admin.require_admin()?;
    accounts::set_balance(&ctx.db, account_id, balance).await
}

/// Flips the ban flag. Admin accounts cannot be banned.
#[instrument(skip(ctx, admin), fields(admin = %admin.account_id))]
pub async fn toggle_ban(ctx: &LedgerContext, admin: &Caller, account_id: &str) -> Result<account::Model> {
    admin.require_admin()?;
    let target = require_unprotected(ctx, account_id).await?;
    accounts::set_banned(&ctx.db, account_id, !target.is_banned).await
}

/// Sets or clears the warning shown to the account.
#[instrument(skip(ctx, admin, warning), fields(admin = %admin.account_id))]
pub async fn set_warning(
    ctx: &LedgerContext,
    admin: &Caller,
    account_id: &str,
    warning: Option<&str>,
) -> Result<account::Model> {
    admin.require_admin()?;
    accounts::set_warning(&ctx.db, account_id, warning).await
}

/// Permanently deletes an account with its transactions and chat history.
/// Admin accounts cannot be purged.
#[instrument(skip(ctx, admin), fields(admin = %admin.account_id))]
pub async fn purge(ctx: &LedgerContext, admin: &Caller, account_id: &str) -> Result<PurgeSummary> {
    admin.require_admin()?;
    require_unprotected(ctx, account_id).await?;
    accounts::purge_account(&ctx.db, account_id).await
}

/// Pauses or resumes withdrawal requests platform-wide.
pub async fn set_maintenance(
    ctx: &LedgerContext,
    admin: &Caller,
    paused: bool,
) -> Result<platform_config::Model> {
    admin.require_admin()?;
    platform::set_withdrawals_paused(&ctx.db, paused, ctx.clock.now()).await
}

/// Publishes or clears the announcement banner.
pub async fn set_announcement(
    ctx: &LedgerContext,
    admin: &Caller,
    announcement: Option<&str>,
) -> Result<platform_config::Model> {
    admin.require_admin()?;
    platform::set_announcement(&ctx.db, announcement, ctx.clock.now()).await
}

/// Replaces the main deposit address and the named deposit channels.
pub async fn set_deposit_addresses(
    ctx: &LedgerContext,
    admin: &Caller,
    main_address: &str,
    channels: Vec<(String, String)>,
) -> Result<PlatformSnapshot> {
    admin.require_admin()?;
    platform::set_deposit_addresses(&ctx.db, main_address, channels, ctx.clock.now()).await
}

/// Platform-wide totals.
pub async fn stats(ctx: &LedgerContext, admin: &Caller) -> Result<PlatformStats> {
    admin.require_admin()?;
    report::platform_stats(&ctx.db).await
}
