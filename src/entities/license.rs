//! License entity - A capability to activate stations under an account.
//!
//! One license per account; the activation count against `max_activations`
//! is enforced by the licensing core, not by a table constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// License database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    /// Unique identifier for the license
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Secret license key handed to the account owner
    #[sea_orm(unique)]
    pub license_key: String,
    /// Owning client id
    pub client_id: String,
    /// When the license was issued
    pub created_at: DateTimeUtc,
    /// Expiry timestamp; None means the license never expires
    pub expires_at: Option<DateTimeUtc>,
    /// Whether the license is currently usable
    pub is_active: bool,
    /// Maximum number of distinct machines that may activate this license
    pub max_activations: i32,
}

/// Defines relationships between License and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One license has many machine activations
    #[sea_orm(has_many = "super::activation::Entity")]
    Activations,
}

impl Related<super::activation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
