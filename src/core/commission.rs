//! Commission engine - splits reported sales into operator fee and
//! client-retained amount.
//!
//! The split uses the client's commission rate *at the moment of sale*; a
//! later tier change never rewrites recorded sales. Scans are pure
//! append-only telemetry with no computation.

use crate::{
    entities::{Sale, sale, scan},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};
use uuid::Uuid;

/// Rounds a dollar amount to whole cents. This is the single rounding
/// policy for all monetary computation in the crate.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A sale as reported by a station.
#[derive(Debug, Clone)]
pub struct SaleReport {
    /// Deck or listing name
    pub deck_name: String,
    /// Format tag
    pub format: String,
    /// Number of cards sold
    pub card_count: i32,
    /// Gross sale value in dollars, must be non-negative and finite
    pub gross_value: f64,
    /// Optional itemization of the cards sold
    pub items: Option<serde_json::Value>,
}

/// Receipt returned to the reporting station.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    /// Id of the persisted sale record
    pub sale_id: String,
    /// Gross sale value as reported
    pub gross_value: f64,
    /// Operator fee taken by the platform
    pub operator_fee: f64,
    /// Amount the client keeps
    pub retained: f64,
    /// Commission percentage that was applied
    pub commission_rate: f64,
}

/// A single scan as reported by a station.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Name of the scanned card; batch entries without one are malformed
    pub card_name: String,
    /// Set code the card belongs to
    pub set_code: String,
    /// Card rarity
    pub rarity: String,
    /// Observed market price in dollars
    pub price: f64,
    /// Recognition confidence score
    pub confidence: f64,
}

/// Outcome of a batch scan submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Entries persisted
    pub recorded: usize,
    /// Malformed entries skipped (missing card name)
    pub skipped: usize,
}

fn generate_sale_id() -> String {
    format!(
        "SALE-{}",
        Uuid::new_v4().simple().to_string()[..8].to_uppercase()
    )
}

/// Records a sale and computes the fee split with the client's current
/// commission rate. The rate read and the sale insert share a transaction,
/// so a concurrent tier change cannot split one sale across two rates.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown client (an unknown reporter is a
/// bug upstream, never a default-rate billing event), or `InvalidAmount`
/// for a negative or non-finite gross value. Nothing is persisted on error.
pub async fn record_sale(
    db: &DatabaseConnection,
    client_id: &str,
    report: SaleReport,
) -> Result<SaleReceipt> {
    if !report.gross_value.is_finite() || report.gross_value < 0.0 {
        return Err(Error::InvalidAmount {
            amount: report.gross_value,
        });
    }

    let txn = db.begin().await?;

    let client = crate::entities::Client::find_by_id(client_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let rate = client.commission_rate;
    let operator_fee = round_cents(report.gross_value * rate / 100.0);
    let retained = round_cents(report.gross_value - operator_fee);
    let sale_id = generate_sale_id();

    let items_json = match report.items {
        Some(items) => Some(serde_json::to_string(&items).map_err(|e| Error::InvalidInput {
            message: format!("Unserializable itemization payload: {e}"),
        })?),
        None => None,
    };

    let model = sale::ActiveModel {
        id: Set(sale_id.clone()),
        client_id: Set(client_id.to_string()),
        deck_name: Set(report.deck_name),
        format: Set(report.format),
        card_count: Set(report.card_count),
        gross_value: Set(report.gross_value),
        operator_fee: Set(operator_fee),
        retained: Set(retained),
        sold_at: Set(Utc::now()),
        items_json: Set(items_json),
    };
    model.insert(&txn).await?;

    txn.commit().await?;

    info!(
        client_id,
        %sale_id,
        gross = report.gross_value,
        fee = operator_fee,
        "Recorded sale"
    );
    Ok(SaleReceipt {
        sale_id,
        gross_value: report.gross_value,
        operator_fee,
        retained,
        commission_rate: rate,
    })
}

/// Records a single card scan. Pure append, no computation.
///
/// # Errors
/// Returns an error if the insert fails.
pub async fn record_scan(
    db: &DatabaseConnection,
    client_id: &str,
    report: ScanReport,
) -> Result<i64> {
    let model = scan::ActiveModel {
        client_id: Set(client_id.to_string()),
        card_name: Set(report.card_name),
        set_code: Set(report.set_code),
        rarity: Set(report.rarity),
        price: Set(report.price),
        confidence: Set(report.confidence),
        scanned_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!(client_id, scan_id = created.id, "Recorded scan");
    Ok(created.id)
}

/// Records a batch of scans. A malformed entry (empty card name) is skipped
/// and counted, never aborts the batch; everything else is appended.
///
/// # Errors
/// Returns an error only if an insert itself fails.
pub async fn record_scans_batch(
    db: &DatabaseConnection,
    client_id: &str,
    scans: Vec<ScanReport>,
) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome {
        recorded: 0,
        skipped: 0,
    };

    for report in scans {
        if report.card_name.trim().is_empty() {
            outcome.skipped += 1;
            continue;
        }
        record_scan(db, client_id, report).await?;
        outcome.recorded += 1;
    }

    debug!(
        client_id,
        recorded = outcome.recorded,
        skipped = outcome.skipped,
        "Recorded scan batch"
    );
    Ok(outcome)
}

/// Returns the most recent sales across all clients, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn recent_sales(db: &DatabaseConnection, limit: u64) -> Result<Vec<sale::Model>> {
    Sale::find()
        .order_by_desc(sale::Column::SoldAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns all sales reported by one client, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn sales_for_client(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::ClientId.eq(client_id))
        .order_by_desc(sale::Column::SoldAt)
        .all(db)
        .await
        .map_err(Into::into)
}
