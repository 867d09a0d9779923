use cloudmine_ledger::{
    config::{self, admins, database},
    context::LedgerContext,
    core::{account, platform, report},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();

    // 3. Ledger settings and tier catalog
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    info!(
        "Loaded {} tiers, minimum withdrawal {:.2}, cycle {}s",
        app_config.catalog.tiers().len(),
        app_config.settings.min_withdrawal,
        app_config.settings.mining_cycle.as_secs()
    );

    // 4. Database and schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    let ctx = LedgerContext::new(db, app_config);
    let now = ctx.clock.now();

    // 5. Explicit admin provisioning
    let admin_ids = admins::get_admin_account_ids();
    if admin_ids.is_empty() {
        info!("No {} configured, no admins provisioned", admins::ADMIN_ACCOUNT_IDS_VAR);
    }
    for id in &admin_ids {
        account::provision_admin(&ctx.db, id, now).await?;
    }

    // 6. Platform configuration row
    let snapshot = platform::load_platform(&ctx.db, now).await?;
    info!(
        "Platform config v{}: withdrawals paused={}, {} deposit channels",
        snapshot.config.version,
        snapshot.config.withdrawals_paused,
        snapshot.channels.len()
    );

    // 7. Summary
    let stats = report::platform_stats(&ctx.db).await?;
    info!(
        "Ledger ready: {} accounts, deposits {:.2}, withdrawals {:.2}, mining payouts {:.2}, VIP sales {:.2}, {} pending requests",
        stats.total_accounts,
        stats.total_deposits,
        stats.total_withdrawals,
        stats.total_mining_payouts,
        stats.total_vip_sales,
        stats.pending_requests
    );

    Ok(())
}
