//! License and activation business logic.
//!
//! A license is a capability to run up to `max_activations` stations. The
//! count-then-insert step in [`validate_and_activate`] runs inside one
//! database transaction so that two stations racing for the last slot cannot
//! both get it. Re-validating an already-activated machine is idempotent and
//! never counts against the cap.

use crate::{
    entities::{Activation, Client, License, activation, license},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default number of machines a fresh license may activate.
pub const DEFAULT_MAX_ACTIVATIONS: i32 = 3;

/// What a station reports when validating its license.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    /// Opaque machine fingerprint
    pub machine_id: String,
    /// Human-readable machine name
    pub machine_name: String,
    /// Caller IP as seen by the request layer, if known
    pub ip_address: Option<String>,
    /// Software version the station is running
    pub version: String,
}

/// Outcome of a successful validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationStatus {
    /// Row id of this machine's activation
    pub activation_id: i64,
    /// Distinct machines currently activated under the license
    pub activations_used: usize,
    /// The license's activation cap
    pub max_activations: i32,
}

fn generate_license_key() -> String {
    let a = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    let b = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("SHQ-{a}-{b}")
}

/// Issues a license for an account. New accounts get exactly one license
/// with the default activation cap and no expiry.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown owner.
pub async fn issue_license(db: &DatabaseConnection, client_id: &str) -> Result<license::Model> {
    Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let model = license::ActiveModel {
        license_key: Set(generate_license_key()),
        client_id: Set(client_id.to_string()),
        created_at: Set(Utc::now()),
        expires_at: Set(None),
        is_active: Set(true),
        max_activations: Set(DEFAULT_MAX_ACTIVATIONS),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(client_id, license_id = created.id, "Issued license");
    Ok(created)
}

/// Looks up a license by its key, active or not.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_license_by_key(
    db: &DatabaseConnection,
    license_key: &str,
) -> Result<Option<license::Model>> {
    License::find()
        .filter(license::Column::LicenseKey.eq(license_key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the active license for an account, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn license_for_client(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Option<license::Model>> {
    License::find()
        .filter(license::Column::ClientId.eq(client_id))
        .filter(license::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all activations under a license, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn activations_for_license(
    db: &DatabaseConnection,
    license_id: i64,
) -> Result<Vec<activation::Model>> {
    Activation::find()
        .filter(activation::Column::LicenseId.eq(license_id))
        .order_by_asc(activation::Column::FirstSeen)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Validates a license key and registers or refreshes the calling machine.
///
/// Known machines get their metadata and `last_seen` refreshed with no limit
/// check. New machines consume an activation slot; the existing count and
/// the insert happen in one transaction so the cap cannot be oversubscribed
/// by concurrent first-time callers.
///
/// # Errors
/// Returns `LicenseInvalid` for an unknown or deactivated key,
/// `LicenseExpired` past the expiry date, or `ActivationLimitReached` when a
/// new machine would exceed the cap.
pub async fn validate_and_activate(
    db: &DatabaseConnection,
    license_key: &str,
    report: ActivationReport,
) -> Result<ActivationStatus> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let lic = License::find()
        .filter(license::Column::LicenseKey.eq(license_key))
        .one(&txn)
        .await?
        .filter(|l| l.is_active)
        .ok_or(Error::LicenseInvalid)?;

    if let Some(expires_at) = lic.expires_at {
        if expires_at < now {
            warn!(license_id = lic.id, "Rejected expired license");
            return Err(Error::LicenseExpired);
        }
    }

    let existing = Activation::find()
        .filter(activation::Column::LicenseId.eq(lic.id))
        .all(&txn)
        .await?;
    let used = existing.len();
    let cap = usize::try_from(lic.max_activations).unwrap_or(0);

    let status = if let Some(known) = existing.iter().find(|a| a.machine_id == report.machine_id) {
        // Same machine phoning back in: refresh metadata, never a new slot
        let activation_id = known.id;
        let mut active: activation::ActiveModel = known.clone().into();
        active.machine_name = Set(report.machine_name);
        active.ip_address = Set(report.ip_address);
        active.version = Set(report.version);
        active.last_seen = Set(now);
        active.update(&txn).await?;

        debug!(license_id = lic.id, activation_id, "Refreshed activation");
        ActivationStatus {
            activation_id,
            activations_used: used,
            max_activations: lic.max_activations,
        }
    } else {
        if used >= cap {
            warn!(license_id = lic.id, used, cap, "Activation limit reached");
            return Err(Error::ActivationLimitReached {
                max: lic.max_activations,
            });
        }

        let model = activation::ActiveModel {
            license_id: Set(lic.id),
            machine_id: Set(report.machine_id),
            machine_name: Set(report.machine_name),
            ip_address: Set(report.ip_address),
            version: Set(report.version),
            first_seen: Set(now),
            last_seen: Set(now),
            ..Default::default()
        };
        let created = model.insert(&txn).await?;

        info!(
            license_id = lic.id,
            activation_id = created.id,
            "Activated new machine"
        );
        ActivationStatus {
            activation_id: created.id,
            activations_used: used + 1,
            max_activations: lic.max_activations,
        }
    };

    txn.commit().await?;
    Ok(status)
}
