//! Operator dashboard roll-ups.
//!
//! Aggregation happens in Rust over full table reads. The fleet is a few
//! hundred clients at most, so clarity wins over SQL aggregate plumbing.

use crate::{
    core::commission::round_cents,
    entities::{Client, Sale, Scan, client},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use std::collections::HashMap;

/// Platform-wide numbers for the operator dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Clients with active status
    pub active_clients: usize,
    /// Sales recorded all time
    pub total_sales: usize,
    /// Gross sales volume all time
    pub total_volume: f64,
    /// Operator fees earned all time
    pub total_fees: f64,
    /// Sales recorded since the month boundary
    pub month_sales: usize,
    /// Gross sales volume since the month boundary
    pub month_volume: f64,
    /// Operator fees earned since the month boundary
    pub month_fees: f64,
    /// Scans recorded all time
    pub total_scans: usize,
    /// Sum of monthly fees across active clients
    pub mrr: f64,
}

/// One row of the client leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    /// Client id
    pub client_id: String,
    /// Client display name
    pub name: String,
    /// Number of sales reported
    pub sales_count: usize,
    /// Gross sales volume
    pub volume: f64,
    /// Operator fees generated
    pub fees: f64,
}

/// Computes the dashboard stats against an explicit month boundary.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn dashboard_stats(
    db: &DatabaseConnection,
    month_start: DateTime<Utc>,
) -> Result<DashboardStats> {
    let clients = Client::find().all(db).await?;
    let active: Vec<_> = clients.iter().filter(|c| c.status == "active").collect();
    let mrr = round_cents(active.iter().map(|c| c.monthly_fee).sum());

    let sales = Sale::find().all(db).await?;
    let mut total_volume = 0.0;
    let mut total_fees = 0.0;
    let mut month_sales = 0;
    let mut month_volume = 0.0;
    let mut month_fees = 0.0;
    for s in &sales {
        total_volume += s.gross_value;
        total_fees += s.operator_fee;
        if s.sold_at >= month_start {
            month_sales += 1;
            month_volume += s.gross_value;
            month_fees += s.operator_fee;
        }
    }

    let total_scans = Scan::find().all(db).await?.len();

    Ok(DashboardStats {
        active_clients: active.len(),
        total_sales: sales.len(),
        total_volume: round_cents(total_volume),
        total_fees: round_cents(total_fees),
        month_sales,
        month_volume: round_cents(month_volume),
        month_fees: round_cents(month_fees),
        total_scans,
        mrr,
    })
}

/// Ranks active clients by gross sales volume, highest first. Clients with
/// no sales are omitted, as are deactivated accounts.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn client_leaderboard(db: &DatabaseConnection) -> Result<Vec<LeaderboardEntry>> {
    let names: HashMap<String, String> = Client::find()
        .filter(client::Column::Status.eq("active"))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut grouped: HashMap<String, LeaderboardEntry> = HashMap::new();
    for s in Sale::find().all(db).await? {
        let Some(name) = names.get(&s.client_id) else {
            continue;
        };
        let entry = grouped
            .entry(s.client_id.clone())
            .or_insert_with(|| LeaderboardEntry {
                client_id: s.client_id.clone(),
                name: name.clone(),
                sales_count: 0,
                volume: 0.0,
                fees: 0.0,
            });
        entry.sales_count += 1;
        entry.volume += s.gross_value;
        entry.fees += s.operator_fee;
    }

    let mut board: Vec<_> = grouped
        .into_values()
        .map(|mut e| {
            e.volume = round_cents(e.volume);
            e.fees = round_cents(e.fees);
            e
        })
        .collect();
    board.sort_by(|a, b| b.volume.partial_cmp(&a.volume).unwrap_or(std::cmp::Ordering::Equal));
    Ok(board)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::commission::{self, SaleReport, ScanReport};
    use crate::core::registry;
    use crate::test_utils::{registered_client, setup_test_db};
    use chrono::Duration;

    fn quick_sale(gross: f64) -> SaleReport {
        SaleReport {
            deck_name: "Mono Red".to_string(),
            format: "Standard".to_string(),
            card_count: 60,
            gross_value: gross,
            items: None,
        }
    }

    #[tokio::test]
    async fn test_dashboard_stats() -> Result<()> {
        let db = setup_test_db().await?;
        let a = registered_client(&db, "Alpha", "alpha@example.test").await?;
        let b = registered_client(&db, "Beta", "beta@example.test").await?;

        commission::record_sale(&db, &a.id, quick_sale(100.0)).await?;
        commission::record_sale(&db, &b.id, quick_sale(50.0)).await?;
        commission::record_scan(
            &db,
            &a.id,
            ScanReport {
                card_name: "Shock".to_string(),
                set_code: "M21".to_string(),
                rarity: "common".to_string(),
                price: 0.25,
                confidence: 0.9,
            },
        )
        .await?;

        let boundary = Utc::now() - Duration::hours(1);
        let stats = dashboard_stats(&db, boundary).await?;
        assert_eq!(stats.active_clients, 2);
        assert_eq!(stats.total_sales, 2);
        assert_eq!(stats.total_volume, 150.0);
        assert_eq!(stats.total_fees, 12.0);
        assert_eq!(stats.month_sales, 2);
        assert_eq!(stats.total_scans, 1);
        assert_eq!(stats.mrr, 58.0);

        // A future boundary excludes everything from the month window
        let stats = dashboard_stats(&db, Utc::now() + Duration::hours(1)).await?;
        assert_eq!(stats.month_sales, 0);
        assert_eq!(stats.month_volume, 0.0);
        assert_eq!(stats.total_sales, 2);

        registry::deactivate(&db, &b.id).await?;
        let stats = dashboard_stats(&db, boundary).await?;
        assert_eq!(stats.active_clients, 1);
        assert_eq!(stats.mrr, 29.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_volume() -> Result<()> {
        let db = setup_test_db().await?;
        let small = registered_client(&db, "Small", "small@example.test").await?;
        let big = registered_client(&db, "Big", "big@example.test").await?;
        registered_client(&db, "Idle", "idle@example.test").await?;

        commission::record_sale(&db, &small.id, quick_sale(10.0)).await?;
        commission::record_sale(&db, &big.id, quick_sale(200.0)).await?;
        commission::record_sale(&db, &big.id, quick_sale(300.0)).await?;

        let board = client_leaderboard(&db).await?;
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Big");
        assert_eq!(board[0].sales_count, 2);
        assert_eq!(board[0].volume, 500.0);
        assert_eq!(board[1].name, "Small");

        // Deactivated accounts drop off the board, their sales stay recorded
        registry::deactivate(&db, &small.id).await?;
        let board = client_leaderboard(&db).await?;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "Big");
        Ok(())
    }
}
