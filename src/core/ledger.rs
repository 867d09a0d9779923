//! Transaction ledger - append-only storage of money-affecting events.
//!
//! Rows are only ever inserted, listed, have their status finalized once, or
//! are removed together with their account during a purge. The status write is
//! conditional on the row still being `PENDING`, which is what turns a second
//! concurrent approval into `AlreadyFinalized` instead of a double credit.

use crate::{
    entities::{Transaction, TransactionStatus, TransactionType, account, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Owning account
    pub account_id: String,
    /// Positive amount
    pub amount: Decimal,
    /// Kind of movement
    pub kind: TransactionType,
    /// Initial status
    pub status: TransactionStatus,
    /// Creation time
    pub date: DateTime<Utc>,
    /// Payment channel or payout destination
    pub method: Option<String>,
    /// Evidence attachment
    pub receipt_url: Option<String>,
    /// Free-text note
    pub description: Option<String>,
}

impl LedgerEntry {
    /// A self-applied entry (tier purchase or mining earning), born approved.
    #[must_use]
    pub fn settled(
        account_id: &str,
        amount: Decimal,
        kind: TransactionType,
        date: DateTime<Utc>,
        description: String,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            amount,
            kind,
            status: TransactionStatus::Approved,
            date,
            method: None,
            receipt_url: None,
            description: Some(description),
        }
    }

    /// A request awaiting an admin decision.
    #[must_use]
    pub fn request(
        account_id: &str,
        amount: Decimal,
        kind: TransactionType,
        date: DateTime<Utc>,
        method: String,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            amount,
            kind,
            status: TransactionStatus::Pending,
            date,
            method: Some(method),
            receipt_url: None,
            description: None,
        }
    }

    fn into_active_model(self) -> transaction::ActiveModel {
        transaction::ActiveModel {
            account_id: Set(self.account_id),
            amount: Set(self.amount),
            kind: Set(self.kind),
            status: Set(self.status),
            date: Set(self.date),
            method: Set(self.method),
            receipt_url: Set(self.receipt_url),
            description: Set(self.description),
            decided_by: Set(None),
            decided_at: Set(None),
            ..Default::default()
        }
    }
}

/// An account snapshot together with the transaction that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Account state after the operation
    pub account: account::Model,
    /// The created or finalized transaction
    pub transaction: transaction::Model,
}

/// Appends an entry to the ledger.
pub async fn record_entry<C>(db: &C, entry: LedgerEntry) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if entry.amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount {
            amount: entry.amount,
        });
    }

    let stored = entry.into_active_model().insert(db).await?;
    info!(
        "Recorded transaction {} for account {}: kind={:?}, status={:?}, amount={:.2}",
        stored.id, stored.account_id, stored.kind, stored.status, stored.amount
    );
    Ok(stored)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id<C>(db: &C, transaction_id: i64) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists transactions newest first, optionally only those of one account.
pub async fn list_transactions<C>(
    db: &C,
    account_id: Option<&str>,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Transaction::find();
    if let Some(account_id) = account_id {
        query = query.filter(transaction::Column::AccountId.eq(account_id));
    }

    let rows = query
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await?;
    debug!("Listed {} transactions (account filter: {:?})", rows.len(), account_id);
    Ok(rows)
}

/// Lists pending transactions oldest first, optionally only one kind.
pub async fn list_pending<C>(db: &C, kind: Option<TransactionType>) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let mut query =
        Transaction::find().filter(transaction::Column::Status.eq(TransactionStatus::Pending));
    if let Some(kind) = kind {
        query = query.filter(transaction::Column::Kind.eq(kind));
    }

    query
        .order_by_asc(transaction::Column::Date)
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a transaction out of `PENDING` with a single conditional update.
///
/// The `WHERE status = 'PENDING'` guard makes the write a compare-and-swap:
/// when another writer finalized the row first, no row is affected and the
/// call fails with `AlreadyFinalized` carrying the status that won.
pub async fn finalize_status<C>(
    db: &C,
    transaction_id: i64,
    status: TransactionStatus,
    decided_by: &str,
    decided_at: DateTime<Utc>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Transaction::update_many()
        .col_expr(transaction::Column::Status, Expr::value(status))
        .col_expr(
            transaction::Column::DecidedBy,
            Expr::value(Some(decided_by.to_string())),
        )
        .col_expr(transaction::Column::DecidedAt, Expr::value(Some(decided_at)))
        .filter(transaction::Column::Id.eq(transaction_id))
        .filter(transaction::Column::Status.eq(TransactionStatus::Pending))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let current = get_transaction_by_id(db, transaction_id)
            .await?
            .ok_or(Error::TransactionNotFound { id: transaction_id })?;
        return Err(Error::AlreadyFinalized {
            id: transaction_id,
            status: current.status,
        });
    }

    info!("Transaction {transaction_id} finalized as {status:?} by {decided_by}");
    Ok(())
}

/// Deletes every transaction of an account. Returns the number removed.
pub async fn delete_for_account<C>(db: &C, account_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Transaction::delete_many()
        .filter(transaction::Column::AccountId.eq(account_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
