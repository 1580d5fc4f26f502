//! Operational entry point: connects to the database, ensures the schema,
//! runs the billing sweep, and logs a revenue snapshot.

use chrono::Utc;
use dotenvy::dotenv;
use station_hq::{
    config::{
        database,
        tiers::{TierTable, default_table},
    },
    core::billing,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Tier table: built-in unless TIER_TABLE points at an override file
    let tier_table = match std::env::var("TIER_TABLE") {
        Ok(path) => TierTable::load(&path)
            .inspect(|_| info!(path, "Loaded tier table override"))
            .inspect_err(|e| error!("Failed to load tier table override: {e}"))?,
        Err(_) => default_table(),
    };

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connected."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ensured."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Billing sweep for everyone whose cycle has come due
    let invoices = billing::generate_due_invoices(&db, &tier_table, Utc::now())
        .await
        .inspect_err(|e| error!("Billing sweep failed: {e}"))?;
    for inv in &invoices {
        info!(
            invoice_id = %inv.id,
            client_id = %inv.client_id,
            amount = inv.amount,
            "Invoice created"
        );
    }

    // 6. Revenue snapshot
    let summary = billing::revenue_summary(&db).await?;
    info!(
        mrr = summary.mrr,
        month_collected = summary.month_collected,
        total_collected = summary.total_collected,
        pending_count = summary.pending_count,
        pending_amount = summary.pending_amount,
        "Revenue summary"
    );

    Ok(())
}
