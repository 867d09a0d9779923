//! Chat message entity - Support conversation history.
//!
//! Messaging itself lives outside the ledger; the table is modelled here so an
//! account purge can remove the account's history in the same transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chat message database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account whose support thread this message belongs to
    pub account_id: String,
    /// Display name of the sender
    pub sender_name: String,
    /// Message body
    pub body: String,
    /// Whether an admin sent the message
    pub is_admin: bool,
    /// When the message was sent
    pub sent_at: DateTimeUtc,
}

/// Defines relationships between `ChatMessage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each message belongs to one account thread
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
