//! Platform configuration entity - The single global settings row.
//! Holds the withdrawal maintenance flag, the announcement banner text
//! and the main deposit address. `version` increases on every update.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Platform configuration database model (always id 1)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_config")]
pub struct Model {
    /// Fixed identifier of the singleton row
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// When true, withdrawal requests are refused
    pub withdrawals_paused: bool,
    /// Announcement shown to every user, None when cleared
    pub announcement: Option<String>,
    /// Primary deposit address
    pub main_deposit_address: String,
    /// Incremented on every update
    pub version: i64,
    /// When this configuration was last modified
    pub updated_at: DateTimeUtc,
}

/// `PlatformConfig` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
