//! Invoice entity - A subscription billing obligation for one period.
//!
//! Creating an invoice advances the client's `next_billing_date` to this
//! invoice's `period_end`; the two writes happen in one transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Invoice identifier, "INV-" plus 8 hex characters
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Billed client id
    pub client_id: String,
    /// Tier the client was on when the invoice was created
    pub tier: String,
    /// Invoice amount: the tier's monthly price at billing time
    pub amount: f64,
    /// Start of the billing period
    pub period_start: DateTimeUtc,
    /// End of the billing period (period_start + 30 days)
    pub period_end: DateTimeUtc,
    /// Invoice status: "pending" or "paid"
    pub status: String,
    /// When payment was recorded
    pub paid_at: Option<DateTimeUtc>,
    /// How the invoice was paid (e.g. "manual", "card")
    pub payment_method: Option<String>,
    /// When the invoice was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
