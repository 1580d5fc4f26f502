//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and registering clients
//! with sensible defaults.

use crate::{
    config::tiers::{TierTable, default_table},
    core::registry::{self, NewClient},
    entities::client,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Returns the built-in tier table used by all tests.
#[must_use]
pub fn test_tier_table() -> TierTable {
    default_table()
}

/// Builds a registration request with no optional contact fields.
#[must_use]
pub fn new_client_request(name: &str, email: &str, tier: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        email: email.to_string(),
        tier: tier.to_string(),
        location: None,
        contact_phone: None,
        notes: None,
    }
}

/// Registers a client on the starter tier with defaults.
pub async fn registered_client(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<client::Model> {
    registry::register(
        db,
        &test_tier_table(),
        new_client_request(name, email, "starter"),
    )
    .await
}
