//! Wallet entity - Seller balance ledger, one per account.
//!
//! `balance` never goes negative: the withdrawal path checks and deducts
//! inside a single transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client id, one wallet per client
    #[sea_orm(unique)]
    pub client_id: String,
    /// Balance available for withdrawal
    pub balance: f64,
    /// Funds credited but not yet cleared for withdrawal
    pub pending_balance: f64,
    /// Lifetime sum of credits
    pub total_earned: f64,
    /// Lifetime sum of approved withdrawals
    pub total_withdrawn: f64,
    /// Payout destination email
    pub payout_email: Option<String>,
    /// Payout method, defaults to "paypal"
    pub payout_method: String,
    /// When the wallet was created
    pub created_at: DateTimeUtc,
    /// Last balance or settings change
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Wallet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One wallet has many ledger transactions
    #[sea_orm(has_many = "super::wallet_transaction::Entity")]
    Transactions,
}

impl Related<super::wallet_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
