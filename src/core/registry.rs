//! Client registry business logic.
//!
//! Handles shop registration, API-key authentication, tier changes, and
//! account lifecycle. Callers are assumed to be pre-authenticated where it
//! matters; `authenticate` itself is the hot path behind every phone-home
//! call and does one indexed lookup plus a `last_seen` touch.

use crate::{
    config::tiers::{Tier, TierTable},
    entities::{Client, client},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};
use uuid::Uuid;

/// Registration request for a new client shop.
#[derive(Debug, Clone)]
pub struct NewClient {
    /// Shop display name
    pub name: String,
    /// Contact email, must be unique
    pub email: String,
    /// Tier name; rejected if not in the tier table
    pub tier: String,
    /// Physical location of the shop
    pub location: Option<String>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

/// Result of a tier change: the recomputed pricing now on the client row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierChange {
    /// New commission percentage
    pub commission_rate: f64,
    /// New monthly fee
    pub monthly_fee: f64,
}

fn generate_client_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

fn generate_api_key() -> String {
    format!("stn_{}", &Uuid::new_v4().simple().to_string()[..24])
}

/// Maps a unique-constraint violation from a client insert onto the
/// duplicate field that caused it.
fn map_client_insert_err(err: DbErr, email: &str) -> Error {
    if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
        if msg.contains("email") {
            return Error::DuplicateEmail {
                email: email.to_string(),
            };
        }
        return Error::DuplicateApiKey;
    }
    err.into()
}

/// Registers a new client shop.
///
/// Generates a fresh client id and station API key and copies the tier's
/// commission rate and monthly fee onto the client row.
///
/// # Errors
/// Returns `InvalidTier` for an unknown tier name, `InvalidInput` for a
/// blank name or email, `DuplicateEmail`/`DuplicateApiKey` on uniqueness
/// violations, or a database error.
pub async fn register(
    db: &DatabaseConnection,
    table: &TierTable,
    new_client: NewClient,
) -> Result<client::Model> {
    if new_client.name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Client name cannot be empty".to_string(),
        });
    }
    if new_client.email.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Client email cannot be empty".to_string(),
        });
    }

    let tier: Tier = new_client.tier.parse()?;
    let pricing = table.pricing(tier);
    let now = Utc::now();
    let email = new_client.email.trim().to_string();

    let model = client::ActiveModel {
        id: Set(generate_client_id()),
        name: Set(new_client.name.trim().to_string()),
        email: Set(email.clone()),
        api_key: Set(generate_api_key()),
        subscription_tier: Set(tier.as_str().to_string()),
        commission_rate: Set(pricing.commission_rate),
        monthly_fee: Set(pricing.monthly_fee),
        status: Set("active".to_string()),
        created_at: Set(now),
        last_seen: Set(now),
        next_billing_date: Set(None),
        location: Set(new_client.location),
        contact_phone: Set(new_client.contact_phone),
        notes: Set(new_client.notes),
    };

    let created = model
        .insert(db)
        .await
        .map_err(|e| map_client_insert_err(e, &email))?;

    info!(client_id = %created.id, tier = %created.subscription_tier, "Registered client");
    Ok(created)
}

/// Authenticates a client by station API key and touches `last_seen`.
///
/// Only active clients authenticate; inactive accounts get `Unauthorized`
/// just like unknown keys, so a revoked key leaks nothing.
///
/// # Errors
/// Returns `Unauthorized` if no active client matches the key.
pub async fn authenticate(db: &DatabaseConnection, api_key: &str) -> Result<client::Model> {
    let found = Client::find()
        .filter(client::Column::ApiKey.eq(api_key))
        .filter(client::Column::Status.eq("active"))
        .one(db)
        .await?
        .ok_or(Error::Unauthorized)?;

    let mut active: client::ActiveModel = found.into();
    active.last_seen = Set(Utc::now());
    let updated = active.update(db).await?;

    debug!(client_id = %updated.id, "Authenticated phone-home call");
    Ok(updated)
}

/// Changes a client's subscription tier, recomputing commission rate and
/// monthly fee from the tier table in the same transaction.
///
/// Already-recorded sales keep the rate they were recorded with; only
/// future sales and invoices see the new pricing.
///
/// # Errors
/// Returns `InvalidTier` for an unknown tier name or `ClientNotFound`.
pub async fn change_tier(
    db: &DatabaseConnection,
    table: &TierTable,
    client_id: &str,
    new_tier: &str,
) -> Result<TierChange> {
    let tier: Tier = new_tier.parse()?;
    let pricing = table.pricing(tier);

    let txn = db.begin().await?;

    let found = Client::find_by_id(client_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let mut active: client::ActiveModel = found.into();
    active.subscription_tier = Set(tier.as_str().to_string());
    active.commission_rate = Set(pricing.commission_rate);
    active.monthly_fee = Set(pricing.monthly_fee);
    active.update(&txn).await?;

    txn.commit().await?;

    info!(client_id, tier = %tier, "Changed client tier");
    Ok(TierChange {
        commission_rate: pricing.commission_rate,
        monthly_fee: pricing.monthly_fee,
    })
}

/// Rotates a client's station API key and returns the new key.
///
/// The old key stops authenticating the moment the update lands.
///
/// # Errors
/// Returns `ClientNotFound`, or `DuplicateApiKey` on the astronomically
/// unlikely collision with an existing key.
pub async fn rotate_api_key(db: &DatabaseConnection, client_id: &str) -> Result<String> {
    let found = Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let new_key = generate_api_key();
    let mut active: client::ActiveModel = found.into();
    active.api_key = Set(new_key.clone());
    active.update(db).await.map_err(|e| {
        if matches!(
            e.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ) {
            Error::DuplicateApiKey
        } else {
            e.into()
        }
    })?;

    info!(client_id, "Rotated station API key");
    Ok(new_key)
}

/// Deactivates a client. Accounts are never hard-deleted; the status flip
/// removes them from authentication, billing scans, and analytics.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown id.
pub async fn deactivate(db: &DatabaseConnection, client_id: &str) -> Result<()> {
    let found = Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let mut active: client::ActiveModel = found.into();
    active.status = Set("inactive".to_string());
    active.update(db).await?;

    info!(client_id, "Deactivated client");
    Ok(())
}

/// Retrieves a client by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_client(db: &DatabaseConnection, client_id: &str) -> Result<Option<client::Model>> {
    Client::find_by_id(client_id).one(db).await.map_err(Into::into)
}

/// Lists all registered clients, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_clients(db: &DatabaseConnection) -> Result<Vec<client::Model>> {
    Client::find()
        .order_by_desc(client::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{new_client_request, setup_test_db, test_tier_table};

    #[tokio::test]
    async fn test_register_assigns_tier_pricing() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let client = register(
            &db,
            &table,
            new_client_request("CardVault NYC", "tom@cardvault.test", "enterprise"),
        )
        .await?;

        assert_eq!(client.subscription_tier, "enterprise");
        assert_eq!(client.commission_rate, 4.0);
        assert_eq!(client.monthly_fee, 199.0);
        assert_eq!(client.status, "active");
        assert!(client.api_key.starts_with("stn_"));
        assert_eq!(client.id.len(), 8);
        assert!(client.next_billing_date.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        register(
            &db,
            &table,
            new_client_request("First", "shared@example.test", "starter"),
        )
        .await?;
        let err = register(
            &db,
            &table,
            new_client_request("Second", "shared@example.test", "starter"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateEmail { email } if email == "shared@example.test"));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_tier() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let err = register(
            &db,
            &table,
            new_client_request("Shop", "shop@example.test", "platinum"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTier { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let err = register(&db, &table, new_client_request("  ", "a@b.test", "starter"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        let err = register(&db, &table, new_client_request("Shop", "", "starter"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_touches_last_seen() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let client = register(
            &db,
            &table,
            new_client_request("Shop", "auth@example.test", "starter"),
        )
        .await?;

        let authed = authenticate(&db, &client.api_key).await?;
        assert_eq!(authed.id, client.id);
        assert!(authed.last_seen >= client.last_seen);

        let err = authenticate(&db, "stn_definitely_not_a_key").await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_rejects_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let client = register(
            &db,
            &table,
            new_client_request("Shop", "inactive@example.test", "starter"),
        )
        .await?;
        deactivate(&db, &client.id).await?;

        let err = authenticate(&db, &client.api_key).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));

        // Row still exists, never hard-deleted
        let row = get_client(&db, &client.id).await?.unwrap();
        assert_eq!(row.status, "inactive");
        Ok(())
    }

    #[tokio::test]
    async fn test_change_tier_updates_all_three_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let client = register(
            &db,
            &table,
            new_client_request("Shop", "tier@example.test", "starter"),
        )
        .await?;

        let change = change_tier(&db, &table, &client.id, "enterprise").await?;
        assert_eq!(change.commission_rate, 4.0);
        assert_eq!(change.monthly_fee, 199.0);

        let row = get_client(&db, &client.id).await?.unwrap();
        assert_eq!(row.subscription_tier, "enterprise");
        assert_eq!(row.commission_rate, 4.0);
        assert_eq!(row.monthly_fee, 199.0);

        let err = change_tier(&db, &table, &client.id, "diamond").await.unwrap_err();
        assert!(matches!(err, Error::InvalidTier { .. }));

        let err = change_tier(&db, &table, "ZZZZZZZZ", "starter").await.unwrap_err();
        assert!(matches!(err, Error::ClientNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_rotate_api_key() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        let client = register(
            &db,
            &table,
            new_client_request("Shop", "rotate@example.test", "starter"),
        )
        .await?;
        let old_key = client.api_key.clone();

        let new_key = rotate_api_key(&db, &client.id).await?;
        assert_ne!(new_key, old_key);

        // Old key no longer authenticates, new one does
        assert!(matches!(
            authenticate(&db, &old_key).await.unwrap_err(),
            Error::Unauthorized
        ));
        assert_eq!(authenticate(&db, &new_key).await?.id, client.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_clients_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let table = test_tier_table();

        register(
            &db,
            &table,
            new_client_request("A", "a@example.test", "starter"),
        )
        .await?;
        register(
            &db,
            &table,
            new_client_request("B", "b@example.test", "starter"),
        )
        .await?;

        let clients = list_clients(&db).await?;
        assert_eq!(clients.len(), 2);
        assert!(clients[0].created_at >= clients[1].created_at);
        Ok(())
    }
}
