//! Scan entity - Append-only telemetry for a single card scan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Scan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scans")]
pub struct Model {
    /// Unique identifier for the scan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reporting client id
    pub client_id: String,
    /// Name of the scanned card
    pub card_name: String,
    /// Set code the card belongs to
    pub set_code: String,
    /// Card rarity as recognized
    pub rarity: String,
    /// Observed market price in dollars
    pub price: f64,
    /// Recognition confidence score (0.0 - 1.0)
    pub confidence: f64,
    /// When the scan was recorded
    pub scanned_at: DateTimeUtc,
}

/// Defines relationships between Scan and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each scan belongs to one client
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
