//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod chat_message;
pub mod deposit_channel;
pub mod platform_config;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel, Role};
pub use chat_message::{
    Column as ChatMessageColumn, Entity as ChatMessage, Model as ChatMessageModel,
};
pub use deposit_channel::{
    Column as DepositChannelColumn, Entity as DepositChannel, Model as DepositChannelModel,
};
pub use platform_config::{
    Column as PlatformConfigColumn, Entity as PlatformConfig, Model as PlatformConfigModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionStatus, TransactionType,
};
