//! Actions a user performs on their own account.
//!
//! Deposit and withdrawal requests only append a `PENDING` row; the balance
//! moves when an admin approves it. Tier purchases and mining claims are
//! self-applied: the account snapshot and the `APPROVED` ledger row are written
//! together in one database transaction.

use crate::{
    context::LedgerContext,
    core::{
        account as accounts,
        identity::Caller,
        ledger::{self, LedgerEntry, Settlement},
        mining::{self, CycleState, cycle_state},
        platform::{self, MAIN_CHANNEL},
        reconcile,
        tier::Tier,
    },
    entities::{TransactionType, account, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Destination recorded for a withdrawal that names none
pub const DEFAULT_WITHDRAWAL_DESTINATION: &str = "Generic";

/// What a user sees on the mining page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningStatus {
    /// Active tier, if any
    pub tier: Option<Tier>,
    /// When the current cycle started
    pub started_at: Option<DateTime<Utc>>,
    /// Cycle state at the time of the query
    pub state: CycleState,
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

/// Registers the caller's account.
#[instrument(skip(ctx, caller), fields(account = %caller.account_id))]
pub async fn register(
    ctx: &LedgerContext,
    caller: &Caller,
    username: &str,
    email: &str,
) -> Result<account::Model> {
    accounts::register_account(&ctx.db, &caller.account_id, username, email, ctx.clock.now()).await
}

/// The caller's own account.
pub async fn my_account(ctx: &LedgerContext, caller: &Caller) -> Result<account::Model> {
    accounts::require_account(&ctx.db, &caller.account_id).await
}

/// The caller's transaction history, newest first.
pub async fn my_transactions(ctx: &LedgerContext, caller: &Caller) -> Result<Vec<transaction::Model>> {
    ledger::list_transactions(&ctx.db, Some(&caller.account_id)).await
}

/// Files a deposit for admin review.
///
/// A blank method means the main deposit address. When deposit channels are
/// configured the method must name one of them.
#[instrument(skip(ctx, caller, receipt_url), fields(account = %caller.account_id))]
pub async fn request_deposit(
    ctx: &LedgerContext,
    caller: &Caller,
    amount: Decimal,
    method: &str,
    receipt_url: Option<&str>,
) -> Result<transaction::Model> {
    validate_amount(amount)?;
    let now = ctx.clock.now();

    accounts::require_account(&ctx.db, &caller.account_id).await?;

    let method = match method.trim() {
        "" => MAIN_CHANNEL,
        named => named,
    };
    platform::load_platform(&ctx.db, now)
        .await?
        .validate_deposit_method(method)
        .inspect_err(|e| warn!("Deposit refused: {e}"))?;

    let mut entry = LedgerEntry::request(
        &caller.account_id,
        amount,
        TransactionType::Deposit,
        now,
        method.to_string(),
    );
    entry.receipt_url = receipt_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(ToString::to_string);

    ledger::record_entry(&ctx.db, entry).await
}

/// Files a withdrawal for admin review.
///
/// Checked in order: the maintenance flag, the amount, the withdrawal floor,
/// then the current balance. Nothing is reserved; the balance is checked again
/// at approval.
#[instrument(skip(ctx, caller), fields(account = %caller.account_id))]
pub async fn request_withdrawal(
    ctx: &LedgerContext,
    caller: &Caller,
    amount: Decimal,
    destination: &str,
) -> Result<transaction::Model> {
    let now = ctx.clock.now();

    let config = platform::get_platform_config(&ctx.db, now).await?;
    if config.withdrawals_paused {
        warn!("Withdrawal refused for {}: maintenance mode", caller.account_id);
        return Err(Error::MaintenanceMode);
    }

    validate_amount(amount)?;
    let minimum = ctx.settings.min_withdrawal;
    if amount < minimum {
        return Err(Error::BelowMinimumWithdrawal { amount, minimum });
    }

    let account = accounts::require_account(&ctx.db, &caller.account_id).await?;
    if account.wallet_balance < amount {
        warn!(
            "Withdrawal refused for {}: balance {:.2} < {amount:.2}",
            account.id, account.wallet_balance
        );
        return Err(Error::InsufficientFunds {
            current: account.wallet_balance,
            required: amount,
        });
    }

    let destination = match destination.trim() {
        "" => DEFAULT_WITHDRAWAL_DESTINATION,
        named => named,
    };
    ledger::record_entry(
        &ctx.db,
        LedgerEntry::request(
            &caller.account_id,
            amount,
            TransactionType::Withdrawal,
            now,
            destination.to_string(),
        ),
    )
    .await
}

/// Buys `tier_id`, forfeiting any running mining cycle.
#[instrument(skip(ctx, caller), fields(account = %caller.account_id))]
pub async fn purchase_tier(ctx: &LedgerContext, caller: &Caller, tier_id: i32) -> Result<Settlement> {
    let tier = ctx.catalog.require(tier_id)?;
    let now = ctx.clock.now();

    let txn = ctx.db.begin().await?;
    let current = accounts::require_account(&txn, &caller.account_id).await?;

    let (updated, entry) = reconcile::purchase_tier(&current, tier, now)
        .inspect_err(|e| warn!("Tier purchase refused for {}: {e}", current.id))?;
    if current.mining_timer_start.is_some() {
        info!("Account {} forfeits its running mining cycle", current.id);
    }
    let account = accounts::write_snapshot(&txn, &current, &updated).await?;
    let transaction = ledger::record_entry(&txn, entry).await?;
    txn.commit().await?;

    info!(
        "Account {} upgraded to {}; balance {:.2}",
        account.id, tier.name, account.wallet_balance
    );
    Ok(Settlement {
        account,
        transaction,
    })
}

/// Starts a mining cycle on the caller's active tier.
#[instrument(skip(ctx, caller), fields(account = %caller.account_id))]
pub async fn start_mining(ctx: &LedgerContext, caller: &Caller) -> Result<account::Model> {
    let now = ctx.clock.now();
    let current = accounts::require_account(&ctx.db, &caller.account_id).await?;

    let updated = mining::start_cycle(&current, now, ctx.settings.mining_cycle)
        .inspect_err(|e| warn!("Mining start refused for {}: {e}", current.id))?;
    let account = accounts::write_snapshot(&ctx.db, &current, &updated).await?;

    info!("Account {} started mining at {now}", account.id);
    Ok(account)
}

/// Claims the payout of a completed mining cycle.
#[instrument(skip(ctx, caller), fields(account = %caller.account_id))]
pub async fn claim_mining(ctx: &LedgerContext, caller: &Caller) -> Result<Settlement> {
    let now = ctx.clock.now();

    let txn = ctx.db.begin().await?;
    let current = accounts::require_account(&txn, &caller.account_id).await?;

    let (updated, entry) =
        reconcile::claim_mining_earning(&current, &ctx.catalog, now, ctx.settings.mining_cycle)
            .inspect_err(|e| warn!("Mining claim refused for {}: {e}", current.id))?;
    let account = accounts::write_snapshot(&txn, &current, &updated).await?;
    let transaction = ledger::record_entry(&txn, entry).await?;
    txn.commit().await?;

    info!(
        "Account {} claimed {:.2}; balance {:.2}",
        account.id, transaction.amount, account.wallet_balance
    );
    Ok(Settlement {
        account,
        transaction,
    })
}

/// Current mining state of the caller.
pub async fn mining_status(ctx: &LedgerContext, caller: &Caller) -> Result<MiningStatus> {
    let account = accounts::require_account(&ctx.db, &caller.account_id).await?;
    let tier = account
        .active_tier_id
        .and_then(|id| ctx.catalog.get(id))
        .cloned();

    Ok(MiningStatus {
        tier,
        started_at: account.mining_timer_start,
        state: cycle_state(
            account.mining_timer_start,
            ctx.clock.now(),
            ctx.settings.mining_cycle,
        ),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::clock::Clock;
    use crate::core::admin;
    use crate::entities::TransactionStatus;
    use crate::test_utils::*;
    use chrono::TimeDelta;
    use std::time::Duration;

    #[tokio::test]
    async fn test_register_and_read_back() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        let alice = Caller::user("alice");

        let created = register(&ctx, &alice, "Alice", "alice@example.com").await?;
        assert_eq!(created.wallet_balance, Decimal::ZERO);
        assert_eq!(my_account(&ctx, &alice).await?, created);
        assert!(my_transactions(&ctx, &alice).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_request_is_pending() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        create_funded_account(&ctx.db, "alice", Decimal::ZERO).await?;
        let alice = Caller::user("alice");

        let deposit =
            request_deposit(&ctx, &alice, money("40"), "  ", Some("https://receipts/1.png")).await?;
        assert_eq!(deposit.status, TransactionStatus::Pending);
        assert_eq!(deposit.kind, TransactionType::Deposit);
        assert_eq!(deposit.method.as_deref(), Some(MAIN_CHANNEL));
        assert_eq!(deposit.receipt_url.as_deref(), Some("https://receipts/1.png"));

        let account = my_account(&ctx, &alice).await?;
        assert_eq!(account.wallet_balance, Decimal::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_request_validation() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        let admin_caller = create_test_admin(&ctx.db, "root").await?;
        create_funded_account(&ctx.db, "alice", Decimal::ZERO).await?;
        let alice = Caller::user("alice");

        assert!(matches!(
            request_deposit(&ctx, &alice, money("-5"), "main", None).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            request_deposit(&ctx, &Caller::user("ghost"), money("5"), "main", None).await,
            Err(Error::AccountNotFound { .. })
        ));

        admin::set_deposit_addresses(
            &ctx,
            &admin_caller,
            "TMain",
            vec![("USDT (TRC20)".to_string(), "TAddr".to_string())],
        )
        .await?;
        assert!(matches!(
            request_deposit(&ctx, &alice, money("5"), "DOGE", None).await,
            Err(Error::UnknownDepositChannel { .. })
        ));
        let accepted = request_deposit(&ctx, &alice, money("5"), "USDT (TRC20)", None).await?;
        assert_eq!(accepted.method.as_deref(), Some("USDT (TRC20)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_withdrawal_request_checks() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        let admin_caller = create_test_admin(&ctx.db, "root").await?;
        create_funded_account(&ctx.db, "alice", money("50")).await?;
        let alice = Caller::user("alice");

        assert!(matches!(
            request_withdrawal(&ctx, &alice, money("9.99"), "wallet").await,
            Err(Error::BelowMinimumWithdrawal { .. })
        ));
        assert!(matches!(
            request_withdrawal(&ctx, &alice, money("60"), "wallet").await,
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            request_withdrawal(&ctx, &alice, Decimal::ZERO, "wallet").await,
            Err(Error::InvalidAmount { .. })
        ));

        let withdrawal = request_withdrawal(&ctx, &alice, money("10"), "").await?;
        assert_eq!(withdrawal.status, TransactionStatus::Pending);
        assert_eq!(
            withdrawal.method.as_deref(),
            Some(DEFAULT_WITHDRAWAL_DESTINATION)
        );
        assert_eq!(my_account(&ctx, &alice).await?.wallet_balance, money("50"));

        admin::set_maintenance(&ctx, &admin_caller, true).await?;
        assert!(matches!(
            request_withdrawal(&ctx, &alice, money("20"), "wallet").await,
            Err(Error::MaintenanceMode)
        ));
        // maintenance is reported before any amount check
        assert!(matches!(
            request_withdrawal(&ctx, &alice, money("1"), "wallet").await,
            Err(Error::MaintenanceMode)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_then_mine_then_claim() -> Result<()> {
        let (ctx, clock) = setup_test_context().await?;
        create_funded_account(&ctx.db, "alice", money("100")).await?;
        let alice = Caller::user("alice");

        let purchase = purchase_tier(&ctx, &alice, 1).await?;
        assert_eq!(purchase.account.wallet_balance, money("75"));
        assert_eq!(purchase.account.active_tier_id, Some(1));
        assert_eq!(purchase.transaction.kind, TransactionType::VipPurchase);
        assert_eq!(purchase.transaction.status, TransactionStatus::Approved);
        assert_eq!(purchase.transaction.amount, money("25"));

        start_mining(&ctx, &alice).await?;
        clock.advance(TimeDelta::hours(24));

        let claim = claim_mining(&ctx, &alice).await?;
        assert_eq!(claim.account.wallet_balance, money("76.5"));
        assert_eq!(claim.account.mining_timer_start, None);
        assert_eq!(claim.transaction.kind, TransactionType::MiningEarning);
        assert_eq!(claim.transaction.amount, money("1.5"));

        let stored = my_account(&ctx, &alice).await?;
        assert_eq!(stored, claim.account);

        let history = my_transactions(&ctx, &alice).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, TransactionType::MiningEarning);
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_boundary() -> Result<()> {
        let (ctx, clock) = setup_test_context().await?;
        create_funded_account(&ctx.db, "alice", money("25")).await?;
        let alice = Caller::user("alice");
        purchase_tier(&ctx, &alice, 1).await?;
        start_mining(&ctx, &alice).await?;

        clock.advance(TimeDelta::hours(24) - TimeDelta::milliseconds(1));
        let early = claim_mining(&ctx, &alice).await;
        assert!(matches!(
            early,
            Err(Error::CycleNotComplete { remaining }) if remaining == Duration::from_millis(1)
        ));
        assert_eq!(my_account(&ctx, &alice).await?.wallet_balance, Decimal::ZERO);

        clock.advance(TimeDelta::milliseconds(1));
        let claim = claim_mining(&ctx, &alice).await?;
        assert_eq!(claim.account.wallet_balance, money("1.5"));

        let again = claim_mining(&ctx, &alice).await;
        assert!(matches!(again, Err(Error::CycleNotComplete { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_upgrade_forfeits_running_cycle() -> Result<()> {
        let (ctx, clock) = setup_test_context().await?;
        create_funded_account(&ctx.db, "alice", money("75")).await?;
        let alice = Caller::user("alice");
        purchase_tier(&ctx, &alice, 1).await?;
        start_mining(&ctx, &alice).await?;

        clock.advance(TimeDelta::hours(23));
        let upgrade = purchase_tier(&ctx, &alice, 2).await?;
        assert_eq!(upgrade.account.mining_timer_start, None);
        assert_eq!(upgrade.account.wallet_balance, Decimal::ZERO);

        clock.advance(TimeDelta::hours(2));
        assert!(matches!(
            claim_mining(&ctx, &alice).await,
            Err(Error::CycleNotComplete { .. })
        ));
        let status = mining_status(&ctx, &alice).await?;
        assert_eq!(status.state, CycleState::Idle);
        assert_eq!(status.tier.map(|tier| tier.id), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_tier_rules() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        create_funded_account(&ctx.db, "alice", money("60")).await?;
        let alice = Caller::user("alice");

        assert!(matches!(
            purchase_tier(&ctx, &alice, 42).await,
            Err(Error::TierNotFound { id: 42 })
        ));
        assert!(matches!(
            purchase_tier(&ctx, &alice, 3).await,
            Err(Error::InsufficientFunds { .. })
        ));

        purchase_tier(&ctx, &alice, 2).await?;
        assert!(matches!(
            purchase_tier(&ctx, &alice, 1).await,
            Err(Error::InvalidTierTransition { .. })
        ));
        assert!(matches!(
            purchase_tier(&ctx, &alice, 2).await,
            Err(Error::InvalidTierTransition { .. })
        ));

        let account = my_account(&ctx, &alice).await?;
        assert_eq!(account.wallet_balance, money("10"));
        assert_eq!(my_transactions(&ctx, &alice).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_mining_status_and_start_rules() -> Result<()> {
        let (ctx, clock) = setup_test_context().await?;
        create_funded_account(&ctx.db, "alice", money("25")).await?;
        let alice = Caller::user("alice");

        assert!(matches!(
            start_mining(&ctx, &alice).await,
            Err(Error::NoActiveTier)
        ));
        let idle = mining_status(&ctx, &alice).await?;
        assert_eq!(idle.tier, None);
        assert_eq!(idle.state, CycleState::Idle);

        purchase_tier(&ctx, &alice, 1).await?;
        let started = start_mining(&ctx, &alice).await?;
        assert_eq!(started.mining_timer_start, Some(clock.now()));
        assert!(matches!(
            start_mining(&ctx, &alice).await,
            Err(Error::CycleAlreadyStarted)
        ));

        clock.advance(TimeDelta::hours(6));
        let running = mining_status(&ctx, &alice).await?;
        assert_eq!(
            running.state,
            CycleState::Running {
                remaining: Duration::from_secs(18 * 3600)
            }
        );

        clock.advance(TimeDelta::hours(18));
        assert!(mining_status(&ctx, &alice).await?.state.is_complete());
        Ok(())
    }

    #[tokio::test]
    async fn test_withdrawal_exceeding_balance_at_approval() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        let admin_caller = create_test_admin(&ctx.db, "root").await?;
        create_funded_account(&ctx.db, "alice", money("20")).await?;
        let alice = Caller::user("alice");

        let withdrawal = request_withdrawal(&ctx, &alice, money("15"), "wallet").await?;
        admin::set_balance(&ctx, &admin_caller, "alice", money("5")).await?;

        let result = admin::approve(&ctx, &admin_caller, withdrawal.id).await;
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
        let pending = admin::pending_withdrawals(&ctx, &admin_caller).await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(my_account(&ctx, &alice).await?.wallet_balance, money("5"));
        Ok(())
    }

    #[tokio::test]
    async fn test_cents_add_up_exactly() -> Result<()> {
        let (ctx, _clock) = setup_test_context().await?;
        let admin_caller = create_test_admin(&ctx.db, "root").await?;
        create_test_account(&ctx.db, "alice").await?;
        let alice = Caller::user("alice");

        for amount in ["10.10", "0.20"] {
            let deposit = request_deposit(&ctx, &alice, money(amount), "main", None).await?;
            admin::approve(&ctx, &admin_caller, deposit.id).await?;
        }
        assert_eq!(my_account(&ctx, &alice).await?.wallet_balance, money("10.30"));

        let withdrawal = request_withdrawal(&ctx, &alice, money("10.30"), "wallet").await?;
        let settled = admin::approve(&ctx, &admin_caller, withdrawal.id).await?;
        assert_eq!(settled.account.wallet_balance, Decimal::ZERO);
        assert_eq!(my_account(&ctx, &alice).await?.wallet_balance, Decimal::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_never_negative_across_mixed_operations() -> Result<()> {
        async fn balance(ctx: &LedgerContext, caller: &Caller) -> Result<Decimal> {
            let balance = my_account(ctx, caller).await?.wallet_balance;
            assert!(balance >= Decimal::ZERO, "balance went negative: {balance}");
            Ok(balance)
        }

        let (ctx, _clock) = setup_test_context().await?;
        let admin_caller = create_test_admin(&ctx.db, "root").await?;
        create_funded_account(&ctx.db, "alice", money("100")).await?;
        let alice = Caller::user("alice");

        let first = request_withdrawal(&ctx, &alice, money("30"), "wallet").await?;
        balance(&ctx, &alice).await?;

        purchase_tier(&ctx, &alice, 1).await?;
        assert_eq!(balance(&ctx, &alice).await?, money("75"));

        admin::set_balance(&ctx, &admin_caller, "alice", money("40")).await?;
        balance(&ctx, &alice).await?;

        admin::approve(&ctx, &admin_caller, first.id).await?;
        assert_eq!(balance(&ctx, &alice).await?, money("10"));

        assert!(matches!(
            purchase_tier(&ctx, &alice, 2).await,
            Err(Error::InsufficientFunds { .. })
        ));
        balance(&ctx, &alice).await?;

        let second = request_withdrawal(&ctx, &alice, money("10"), "wallet").await?;
        admin::set_balance(&ctx, &admin_caller, "alice", money("5")).await?;
        assert!(matches!(
            admin::approve(&ctx, &admin_caller, second.id).await,
            Err(Error::InsufficientFunds { .. })
        ));
        assert_eq!(balance(&ctx, &alice).await?, money("5"));

        admin::set_balance(&ctx, &admin_caller, "alice", money("60")).await?;
        purchase_tier(&ctx, &alice, 2).await?;
        assert_eq!(balance(&ctx, &alice).await?, money("10"));

        admin::approve(&ctx, &admin_caller, second.id).await?;
        assert_eq!(balance(&ctx, &alice).await?, Decimal::ZERO);

        assert!(matches!(
            request_withdrawal(&ctx, &alice, money("10"), "wallet").await,
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            admin::set_balance(&ctx, &admin_caller, "alice", money("-0.01")).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert_eq!(balance(&ctx, &alice).await?, Decimal::ZERO);
        Ok(())
    }
}
