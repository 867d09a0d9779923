//! Core business logic - framework-agnostic ledger operations.
//!
//! The leaves (`tier`, `account`, `ledger`) own storage. `mining` and
//! `reconcile` are pure rules over snapshots. `admin` and `self_service` are the
//! entry points callers use; they load fresh state, apply the rules and persist
//! the result.

/// Admin approval workflow and account moderation
pub mod admin;
/// Account store
pub mod account;
/// Caller identity
pub mod identity;
/// Transaction ledger
pub mod ledger;
/// Mining cycle state machine
pub mod mining;
/// Global platform configuration
pub mod platform;
/// Pure balance and status rules
pub mod reconcile;
/// Platform statistics
pub mod report;
/// User self-service actions
pub mod self_service;
/// Tier catalog
pub mod tier;
