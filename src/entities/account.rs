//! Account entity - One row per registered user.
//!
//! Holds the wallet balance, the active tier, the mining timer and the
//! moderation flags. `version` is bumped on every write so snapshot writes can
//! be made conditional on the state they were computed from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an account
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Role {
    /// Regular platform user
    #[sea_orm(string_value = "USER")]
    User,
    /// Administrator
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

/// Account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Identifier issued by the identity provider
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name chosen at registration
    pub username: String,
    /// Contact email
    pub email: String,
    /// Current wallet balance, never negative
    pub wallet_balance: Decimal,
    /// Active tier id, None when no subscription is active
    pub active_tier_id: Option<i32>,
    /// Start of the running mining cycle, None when idle
    pub mining_timer_start: Option<DateTimeUtc>,
    /// Whether session issuance is blocked for this account
    pub is_banned: bool,
    /// Free-text admin annotation
    pub warning: Option<String>,
    /// USER or ADMIN
    pub role: Role,
    /// Registration time
    pub created_at: DateTimeUtc,
    /// Write counter for optimistic concurrency
    pub version: i64,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One account has many chat messages
    #[sea_orm(has_many = "super::chat_message::Entity")]
    ChatMessages,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::chat_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatMessages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
