//! Client entity - A registered shop/account in the network.
//!
//! Each client carries its subscription tier together with the commission
//! rate and monthly fee the tier implies. The rate and fee columns are never
//! edited independently; a tier change rewrites all three in one transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Short uppercase hex identifier assigned at registration
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Shop display name
    pub name: String,
    /// Contact email, unique across clients
    #[sea_orm(unique)]
    pub email: String,
    /// Station API key used for phone-home authentication
    #[sea_orm(unique)]
    pub api_key: String,
    /// Subscription tier name ("starter", "professional", "enterprise", "founders")
    pub subscription_tier: String,
    /// Commission percentage applied to reported sales, from the tier table
    pub commission_rate: f64,
    /// Monthly subscription fee in dollars, from the tier table
    pub monthly_fee: f64,
    /// Account status: "active" or "inactive" (never hard-deleted)
    pub status: String,
    /// When the client registered
    pub created_at: DateTimeUtc,
    /// Last authenticated call from any of this client's stations
    pub last_seen: DateTimeUtc,
    /// When the next subscription invoice is due; None until first invoiced
    pub next_billing_date: Option<DateTimeUtc>,
    /// Physical location of the shop
    pub location: Option<String>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client reports many sales
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
    /// One client reports many scans
    #[sea_orm(has_many = "super::scan::Entity")]
    Scans,
    /// One client accrues many subscription invoices
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl Related<super::scan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scans.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
