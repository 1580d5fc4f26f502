//! Sale entity - An immutable sale fact reported by a client station.
//!
//! The fee split is computed once at recording time with the client's
//! commission rate at that moment; later tier changes never touch these rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Sale identifier, "SALE-" plus 8 hex characters
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Reporting client id
    pub client_id: String,
    /// Deck or listing name as sold
    pub deck_name: String,
    /// Format tag (e.g. "Commander", "Standard")
    pub format: String,
    /// Number of cards in the sale
    pub card_count: i32,
    /// Gross sale value in dollars
    pub gross_value: f64,
    /// Operator fee retained by the platform, rounded to cents
    pub operator_fee: f64,
    /// Amount the client keeps, rounded to cents
    pub retained: f64,
    /// When the sale was recorded
    pub sold_at: DateTimeUtc,
    /// Optional JSON itemization of the cards sold
    pub items_json: Option<String>,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one client
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
