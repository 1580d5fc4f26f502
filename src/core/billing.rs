//! Subscription billing engine.
//!
//! Invoices are generated from each client's `next_billing_date`; creating
//! one advances that date by a 30-day cycle inside the same transaction.
//! [`create_invoice`] itself carries no due-date guard, the periodic
//! [`generate_due_invoices`] sweep is the only caller expected to apply one.

use crate::{
    config::tiers::{Tier, TierTable},
    entities::{Client, Invoice, client, invoice},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Duration, Local, LocalResult, TimeZone, Utc};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Length of one billing cycle.
pub const BILLING_CYCLE_DAYS: i64 = 30;

fn generate_invoice_id() -> String {
    format!(
        "INV-{}",
        Uuid::new_v4().simple().to_string()[..8].to_uppercase()
    )
}

/// Creates an invoice for a client's next billing cycle and advances the
/// client's `next_billing_date` by one cycle, both in one transaction.
///
/// The amount comes from the tier table, not the client row, so a stale
/// `monthly_fee` column never leaks into a new invoice. Passing
/// `tier_override` bills a different tier without changing the client.
///
/// Callers decide *when* to bill; this function will happily create two
/// invoices for the same period if called twice.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown client or `InvalidTier` for an
/// unknown override.
pub async fn create_invoice(
    db: &DatabaseConnection,
    table: &TierTable,
    client_id: &str,
    tier_override: Option<&str>,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;

    let client = Client::find_by_id(client_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let tier_name = tier_override.unwrap_or(client.subscription_tier.as_str());
    let tier: Tier = tier_name.parse()?;
    let amount = table.pricing(tier).monthly_fee;

    // The billed window always starts at creation time. Anchoring it to a
    // stale next_billing_date would leave an overdue client's new billing
    // date still in the past, so the next sweep would bill them again.
    let now = Utc::now();
    let period_start = now;
    let period_end = period_start + Duration::days(BILLING_CYCLE_DAYS);

    let model = invoice::ActiveModel {
        id: Set(generate_invoice_id()),
        client_id: Set(client.id.clone()),
        tier: Set(tier.as_str().to_string()),
        amount: Set(amount),
        period_start: Set(period_start),
        period_end: Set(period_end),
        status: Set("pending".to_string()),
        paid_at: Set(None),
        payment_method: Set(None),
        created_at: Set(now),
    };
    let created = model.insert(&txn).await?;

    let mut active: client::ActiveModel = client.into();
    active.next_billing_date = Set(Some(period_end));
    active.update(&txn).await?;

    txn.commit().await?;

    info!(
        client_id,
        invoice_id = %created.id,
        amount,
        tier = tier.as_str(),
        "Created invoice"
    );
    Ok(created)
}

/// Marks an invoice paid, recording the payment method and timestamp.
///
/// Returns `Ok(true)` on success, `Ok(false)` if the invoice does not exist
/// or is not pending. Payment webhooks retry and arrive out of order, so an
/// unknown or already-settled invoice is not an error.
///
/// # Errors
/// Returns an error only if the database update fails.
pub async fn mark_invoice_paid(
    db: &DatabaseConnection,
    invoice_id: &str,
    payment_method: &str,
) -> Result<bool> {
    let Some(inv) = Invoice::find_by_id(invoice_id).one(db).await? else {
        warn!(invoice_id, "Payment for unknown invoice ignored");
        return Ok(false);
    };
    if inv.status != "pending" {
        warn!(invoice_id, status = %inv.status, "Duplicate payment ignored");
        return Ok(false);
    }

    let mut active: invoice::ActiveModel = inv.into();
    active.status = Set("paid".to_string());
    active.paid_at = Set(Some(Utc::now()));
    active.payment_method = Set(Some(payment_method.to_string()));
    active.update(db).await?;

    info!(invoice_id, payment_method, "Invoice paid");
    Ok(true)
}

/// Finds active, fee-paying clients whose billing date has arrived.
///
/// A client with no `next_billing_date` at all is due immediately; that is
/// the state of a freshly registered account.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn due_clients(
    db: &DatabaseConnection,
    as_of: DateTime<Utc>,
) -> Result<Vec<client::Model>> {
    Client::find()
        .filter(client::Column::Status.eq("active"))
        .filter(client::Column::MonthlyFee.gt(0.0))
        .filter(
            Condition::any()
                .add(client::Column::NextBillingDate.is_null())
                .add(client::Column::NextBillingDate.lte(as_of)),
        )
        .all(db)
        .await
        .map_err(Into::into)
}

/// Billing sweep: invoices every due client once. Because each invoice
/// advances the client's billing date past `as_of`, running the sweep twice
/// in a row bills nobody twice.
///
/// # Errors
/// Returns an error if a lookup or insert fails mid-sweep; invoices already
/// created stay created.
pub async fn generate_due_invoices(
    db: &DatabaseConnection,
    table: &TierTable,
    as_of: DateTime<Utc>,
) -> Result<Vec<invoice::Model>> {
    let due = due_clients(db, as_of).await?;
    let mut created = Vec::with_capacity(due.len());
    for client in due {
        created.push(create_invoice(db, table, &client.id, None).await?);
    }
    info!(count = created.len(), "Billing sweep complete");
    Ok(created)
}

/// Lists a client's invoices, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn client_invoices(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::ClientId.eq(client_id))
        .order_by_desc(invoice::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists all unpaid invoices, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn pending_invoices(db: &DatabaseConnection) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::Status.eq("pending"))
        .order_by_asc(invoice::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// First instant of the current month on the operator's clock, in UTC.
///
/// Month boundaries follow the deployment's local timezone so that "this
/// month's revenue" matches what the operator sees on a calendar.
#[must_use]
pub fn month_start(now: DateTime<Local>) -> DateTime<Utc> {
    let local = match Local.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        // Midnight skipped by a DST gap: fall back to the UTC first-of-month
        LocalResult::None => {
            return Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);
        }
    };
    local.with_timezone(&Utc)
}

/// Per-tier slice of the active client base.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TierRevenue {
    /// Active clients on this tier
    pub clients: usize,
    /// Sum of their monthly fees
    pub monthly_fees: f64,
}

/// Subscription revenue roll-up for dashboards.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSummary {
    /// Sum of monthly fees across active clients
    pub mrr: f64,
    /// Amount collected since the month boundary
    pub month_collected: f64,
    /// Amount collected all time
    pub total_collected: f64,
    /// Number of unpaid invoices
    pub pending_count: usize,
    /// Dollar value of unpaid invoices
    pub pending_amount: f64,
    /// Headcount and fee sum per tier name, active clients only
    pub tier_breakdown: BTreeMap<String, TierRevenue>,
}

/// Computes the revenue summary with the month boundary taken from the
/// local clock.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn revenue_summary(db: &DatabaseConnection) -> Result<RevenueSummary> {
    revenue_summary_since(db, month_start(Local::now())).await
}

/// Computes the revenue summary against an explicit month boundary.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn revenue_summary_since(
    db: &DatabaseConnection,
    month_start: DateTime<Utc>,
) -> Result<RevenueSummary> {
    let active = Client::find()
        .filter(client::Column::Status.eq("active"))
        .all(db)
        .await?;
    let mrr = crate::core::commission::round_cents(active.iter().map(|c| c.monthly_fee).sum());

    let mut tier_breakdown: BTreeMap<String, TierRevenue> = BTreeMap::new();
    for client in &active {
        let slice = tier_breakdown
            .entry(client.subscription_tier.clone())
            .or_default();
        slice.clients += 1;
        slice.monthly_fees = crate::core::commission::round_cents(slice.monthly_fees + client.monthly_fee);
    }

    let invoices = Invoice::find().all(db).await?;
    let mut month_collected = 0.0;
    let mut total_collected = 0.0;
    let mut pending_count = 0;
    let mut pending_amount = 0.0;
    for inv in &invoices {
        match inv.status.as_str() {
            "paid" => {
                total_collected += inv.amount;
                if inv.paid_at.is_some_and(|paid| paid >= month_start) {
                    month_collected += inv.amount;
                }
            }
            "pending" => {
                pending_count += 1;
                pending_amount += inv.amount;
            }
            _ => {}
        }
    }

    Ok(RevenueSummary {
        mrr,
        month_collected: crate::core::commission::round_cents(month_collected),
        total_collected: crate::core::commission::round_cents(total_collected),
        pending_count,
        pending_amount: crate::core::commission::round_cents(pending_amount),
        tier_breakdown,
    })
}
