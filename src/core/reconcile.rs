//! Reconciliation rules.
//!
//! Every function here is pure: it validates against the snapshot it is given
//! and returns the new snapshot (plus the new or updated transaction) without
//! touching the store. On any failed precondition nothing is returned, so a
//! caller that only persists `Ok` results can never write a partial update.
//!
//! Persisting the result is the job of [`crate::core::admin`] and
//! [`crate::core::self_service`], which re-read fresh state first and write
//! back with conditional updates.

use crate::{
    core::{
        ledger::LedgerEntry,
        mining::{CycleState, cycle_state},
        tier::{Tier, TierCatalog},
    },
    entities::{TransactionStatus, TransactionType, account, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use std::time::Duration;

fn ensure_pending(transaction: &transaction::Model) -> Result<()> {
    if transaction.status != TransactionStatus::Pending {
        return Err(Error::AlreadyFinalized {
            id: transaction.id,
            status: transaction.status,
        });
    }
    if !transaction.kind.requires_approval() {
        return Err(Error::NotApprovable {
            id: transaction.id,
            kind: transaction.kind,
        });
    }
    Ok(())
}

/// Applies an approved deposit or withdrawal to the owning account.
///
/// Deposits always credit. Withdrawals debit only when the balance covers the
/// amount; otherwise `InsufficientFunds` is returned and the transaction stays
/// pending for a later retry or a manual rejection.
pub fn apply_approval(
    transaction: &transaction::Model,
    account: &account::Model,
) -> Result<(account::Model, transaction::Model)> {
    ensure_pending(transaction)?;

    if transaction.account_id != account.id {
        return Err(Error::AccountMismatch {
            transaction_id: transaction.id,
            account_id: account.id.clone(),
        });
    }

    let mut updated_account = account.clone();
    match transaction.kind {
        TransactionType::Deposit => {
            updated_account.wallet_balance += transaction.amount;
        }
        TransactionType::Withdrawal => {
            if account.wallet_balance < transaction.amount {
                return Err(Error::InsufficientFunds {
                    current: account.wallet_balance,
                    required: transaction.amount,
                });
            }
            updated_account.wallet_balance -= transaction.amount;
        }
        TransactionType::VipPurchase | TransactionType::MiningEarning => {
            return Err(Error::NotApprovable {
                id: transaction.id,
                kind: transaction.kind,
            });
        }
    }

    let mut updated_transaction = transaction.clone();
    updated_transaction.status = TransactionStatus::Approved;
    Ok((updated_account, updated_transaction))
}

/// Rejects a pending deposit or withdrawal. Never touches any balance.
pub fn apply_rejection(transaction: &transaction::Model) -> Result<transaction::Model> {
    ensure_pending(transaction)?;

    let mut updated = transaction.clone();
    updated.status = TransactionStatus::Rejected;
    Ok(updated)
}

/// Upgrades the account to `tier`, debiting its price.
///
/// The target must rank strictly above the current tier. Any running mining
/// cycle is forfeited: the timer is cleared and nothing is paid for it.
pub fn purchase_tier(
    account: &account::Model,
    tier: &Tier,
    now: DateTime<Utc>,
) -> Result<(account::Model, LedgerEntry)> {
    if tier.id <= account.active_tier_id.unwrap_or(0) {
        return Err(Error::InvalidTierTransition {
            current: account.active_tier_id,
            requested: tier.id,
        });
    }

    if account.wallet_balance < tier.price {
        return Err(Error::InsufficientFunds {
            current: account.wallet_balance,
            required: tier.price,
        });
    }

    let mut updated = account.clone();
    updated.wallet_balance -= tier.price;
    updated.active_tier_id = Some(tier.id);
    updated.mining_timer_start = None;

    let entry = LedgerEntry::settled(
        &account.id,
        tier.price,
        TransactionType::VipPurchase,
        now,
        format!("Upgrade to {}", tier.name),
    );
    Ok((updated, entry))
}

/// Pays out a completed mining cycle and returns the account to idle.
pub fn claim_mining_earning(
    account: &account::Model,
    catalog: &TierCatalog,
    now: DateTime<Utc>,
    cycle: Duration,
) -> Result<(account::Model, LedgerEntry)> {
    let tier_id = account.active_tier_id.ok_or(Error::NoActiveTier)?;
    let tier = catalog.require(tier_id)?;

    match cycle_state(account.mining_timer_start, now, cycle) {
        CycleState::Complete => {}
        CycleState::Running { remaining } => return Err(Error::CycleNotComplete { remaining }),
        CycleState::Idle => return Err(Error::CycleNotComplete { remaining: cycle }),
    }

    let mut updated = account.clone();
    updated.wallet_balance += tier.daily_return;
    updated.mining_timer_start = None;

    let entry = LedgerEntry::settled(
        &account.id,
        tier.daily_return,
        TransactionType::MiningEarning,
        now,
        format!("{} mining payout", tier.name),
    );
    Ok((updated, entry))
}
