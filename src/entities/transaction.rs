//! Transaction entity - Append-only record of every money-affecting event.
//!
//! Deposits and withdrawals are born `PENDING` and are finalized once by an
//! admin. Tier purchases and mining earnings are born `APPROVED`.
//! `decided_by`/`decided_at` stamp the admin decision.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of money movement
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TransactionType {
    /// Funds paid in, credited on approval
    #[sea_orm(string_value = "DEPOSIT")]
    Deposit,
    /// Funds paid out, debited on approval
    #[sea_orm(string_value = "WITHDRAWAL")]
    Withdrawal,
    /// Tier activation, debited immediately
    #[sea_orm(string_value = "VIP_PURCHASE")]
    VipPurchase,
    /// Mining payout, credited immediately
    #[sea_orm(string_value = "MINING_EARNING")]
    MiningEarning,
}

impl TransactionType {
    /// Whether this kind waits for an admin decision.
    #[must_use]
    pub const fn requires_approval(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdrawal)
    }
}

/// Lifecycle status of a transaction
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TransactionStatus {
    /// Awaiting an admin decision
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Applied to the balance
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Declined, no balance effect
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub account_id: String,
    /// Positive amount
    pub amount: Decimal,
    /// Deposit, withdrawal, tier purchase or mining earning
    pub kind: TransactionType,
    /// Pending, approved or rejected
    pub status: TransactionStatus,
    /// Creation time
    pub date: DateTimeUtc,
    /// Payment channel (deposits) or payout destination (withdrawals)
    pub method: Option<String>,
    /// Evidence attachment for deposits
    pub receipt_url: Option<String>,
    /// Free-text note
    pub description: Option<String>,
    /// Admin who approved or rejected the transaction
    pub decided_by: Option<String>,
    /// When the admin decision was recorded
    pub decided_at: Option<DateTimeUtc>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
