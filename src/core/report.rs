//! Platform statistics for the admin overview.
//!
//! Totals only count `APPROVED` rows, so pending requests and rejected ones
//! never show up as money that moved.

use crate::{
    entities::{Account, Transaction, TransactionStatus, TransactionType, transaction},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, prelude::*};
use serde::Serialize;
use tracing::debug;

/// Platform-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformStats {
    /// Registered accounts
    pub total_accounts: u64,
    /// Sum of approved deposits
    pub total_deposits: Decimal,
    /// Sum of approved withdrawals
    pub total_withdrawals: Decimal,
    /// Sum of mining payouts
    pub total_mining_payouts: Decimal,
    /// Sum of tier purchases
    pub total_vip_sales: Decimal,
    /// Requests still waiting for an admin decision
    pub pending_requests: u64,
}

impl PlatformStats {
    fn add(&mut self, row: &transaction::Model) {
        match row.kind {
            TransactionType::Deposit => self.total_deposits += row.amount,
            TransactionType::Withdrawal => self.total_withdrawals += row.amount,
            TransactionType::MiningEarning => self.total_mining_payouts += row.amount,
            TransactionType::VipPurchase => self.total_vip_sales += row.amount,
        }
    }
}

/// Computes [`PlatformStats`] from the account and transaction tables.
pub async fn platform_stats<C>(db: &C) -> Result<PlatformStats>
where
    C: ConnectionTrait,
{
    let mut stats = PlatformStats {
        total_accounts: Account::find().count(db).await?,
        pending_requests: Transaction::find()
            .filter(transaction::Column::Status.eq(TransactionStatus::Pending))
            .count(db)
            .await?,
        ..Default::default()
    };

    let approved = Transaction::find()
        .filter(transaction::Column::Status.eq(TransactionStatus::Approved))
        .all(db)
        .await?;
    for row in &approved {
        stats.add(row);
    }

    debug!("Computed platform stats over {} approved transactions", approved.len());
    Ok(stats)
}
