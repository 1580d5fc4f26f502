//! Wallet transaction entity - Append-only ledger log.
//!
//! Sign convention: credits are recorded with a positive amount,
//! withdrawals with a negative amount. Rows are never mutated after
//! creation; withdrawal fulfillment status changes happen out of core scope.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Wallet this entry belongs to
    pub wallet_id: i64,
    /// Entry type: "credit" or "withdrawal"
    pub kind: String,
    /// Signed amount: positive for credits, negative for withdrawals
    pub amount: f64,
    /// Human-readable description
    pub description: Option<String>,
    /// External marketplace order reference, if any
    pub order_id: Option<String>,
    /// Entry status: "completed" for credits, "pending" for fresh withdrawals
    pub status: String,
    /// When the entry was appended
    pub created_at: DateTimeUtc,
}

/// Defines relationships between WalletTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry belongs to one wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id"
    )]
    Wallet,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
