//! Activation entity - One row per (license, machine) binding.
//!
//! Created on the first validation call from a new machine and updated in
//! place on every subsequent validation from the same machine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activations")]
pub struct Model {
    /// Unique identifier for the activation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// License this machine is activated under
    pub license_id: i64,
    /// Opaque machine fingerprint reported by the station
    pub machine_id: String,
    /// Human-readable machine name
    pub machine_name: String,
    /// Last IP address the station called from
    pub ip_address: Option<String>,
    /// Software version the station reported
    pub version: String,
    /// First validation call from this machine
    pub first_seen: DateTimeUtc,
    /// Most recent validation call from this machine
    pub last_seen: DateTimeUtc,
}

/// Defines relationships between Activation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each activation belongs to one license
    #[sea_orm(
        belongs_to = "super::license::Entity",
        from = "Column::LicenseId",
        to = "super::license::Column::Id"
    )]
    License,
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::License.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
