//! Release entity - A published software version stations can update to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Release database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "releases")]
pub struct Model {
    /// Unique identifier for the release
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Version string, e.g. "3.0.1"
    #[sea_orm(unique)]
    pub version: String,
    /// Release notes shown to stations
    pub changelog: Option<String>,
    /// Whether stations must install this release before continuing
    pub is_mandatory: bool,
    /// When the release was published
    pub released_at: DateTimeUtc,
}

/// Releases have no relations to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
