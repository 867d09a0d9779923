//! Deposit channel entity - Named token addresses users can pay into.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deposit channel database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposit_channels")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Token or network name, e.g. `"USDT (TRC20)"`
    #[sea_orm(unique)]
    pub name: String,
    /// Address to pay into
    pub address: String,
}

/// `DepositChannel` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
