//! Unified error types for the ledger.
//!
//! Business-rule outcomes (the reconciliation taxonomy) and infrastructure
//! failures share one enum so every operation can return `Result<T>`. Use
//! [`Error::is_business_rule`] to tell the two apart when presenting errors.

use crate::entities::{TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// All errors produced by the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The persisted store failed or is unreachable
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Amount is zero or negative
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// No account with this id
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// Account id
        id: String,
    },

    /// No transaction with this id
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Transaction id
        id: i64,
    },

    /// The tier id is not in the catalog
    #[error("Tier not found: {id}")]
    TierNotFound {
        /// Tier id
        id: i32,
    },

    /// Approval or rejection attempted on a transaction that is no longer pending
    #[error("Transaction {id} is already {status:?}")]
    AlreadyFinalized {
        /// Transaction id
        id: i64,
        /// Status observed when the attempt was made
        status: TransactionStatus,
    },

    /// Balance is too low for a withdrawal or tier purchase
    #[error("Insufficient funds: balance {current:.2}, required {required:.2}")]
    InsufficientFunds {
        /// Balance at the moment of application
        current: Decimal,
        /// Amount that would have been debited
        required: Decimal,
    },

    /// Tier purchase targets the same or a lower tier
    #[error("Cannot move from tier {current:?} to tier {requested}")]
    InvalidTierTransition {
        /// Currently active tier
        current: Option<i32>,
        /// Tier the purchase targeted
        requested: i32,
    },

    /// Mining requires an active tier
    #[error("No active tier on account")]
    NoActiveTier,

    /// Mining claim before the cycle elapsed
    #[error("Mining cycle not complete: {}s remaining", remaining.as_secs())]
    CycleNotComplete {
        /// Time left until the cycle completes
        remaining: Duration,
    },

    /// Mining start while a cycle is already running or awaiting claim
    #[error("A mining cycle is already in progress")]
    CycleAlreadyStarted,

    /// Withdrawals are paused by the global maintenance flag
    #[error("Withdrawals are temporarily disabled for maintenance")]
    MaintenanceMode,

    /// Withdrawal amount is below the configured floor
    #[error("Minimum withdrawal is {minimum:.2}, requested {amount:.2}")]
    BelowMinimumWithdrawal {
        /// Requested amount
        amount: Decimal,
        /// Configured floor
        minimum: Decimal,
    },

    /// Only deposits and withdrawals go through the approval workflow
    #[error("Transaction {id} of kind {kind:?} cannot be approved or rejected")]
    NotApprovable {
        /// Transaction id
        id: i64,
        /// Kind of the transaction
        kind: TransactionType,
    },

    /// The transaction does not belong to the supplied account
    #[error("Transaction {transaction_id} does not belong to account {account_id}")]
    AccountMismatch {
        /// Transaction id
        transaction_id: i64,
        /// Account the caller supplied
        account_id: String,
    },

    /// Admin operation targeted an ADMIN account
    #[error("Account {id} is an administrator and cannot be modified this way")]
    ProtectedAccount {
        /// Account id
        id: String,
    },

    /// Caller lacks the ADMIN role
    #[error("Account {account_id} is not authorized for this operation")]
    Unauthorized {
        /// Caller's account id
        account_id: String,
    },

    /// Deposit names a payment channel that is not configured
    #[error("Unknown deposit channel: {channel}")]
    UnknownDepositChannel {
        /// Channel the user picked
        channel: String,
    },

    /// The account changed between read and write
    #[error("Account {id} was modified concurrently, retry the operation")]
    StaleAccount {
        /// Account id
        id: String,
    },
}

impl Error {
    /// True for expected, recoverable business-rule outcomes that should be shown
    /// to the user or admin as-is.
    #[must_use]
    pub const fn is_business_rule(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. }
                | Self::Database(_)
                | Self::Io(_)
                | Self::EnvVar(_)
                | Self::StaleAccount { .. }
        )
    }

    /// True when repeating the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::StaleAccount { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rules_are_not_retryable() {
        let err = Error::InsufficientFunds {
            current: Decimal::new(5, 0),
            required: Decimal::TEN,
        };
        assert!(err.is_business_rule());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Insufficient funds: balance 5.00, required 10.00"
        );
    }

    #[test]
    fn test_store_errors_are_distinct_from_taxonomy() {
        let err = Error::Database(sea_orm::DbErr::Custom("connection reset".to_string()));
        assert!(!err.is_business_rule());
        assert!(err.is_retryable());

        let stale = Error::StaleAccount {
            id: "user-1".to_string(),
        };
        assert!(!stale.is_business_rule());
        assert!(stale.is_retryable());
    }

    #[test]
    fn test_cycle_not_complete_message() {
        let err = Error::CycleNotComplete {
            remaining: Duration::from_secs(90),
        };
        assert_eq!(err.to_string(), "Mining cycle not complete: 90s remaining");
    }
}
