//! Software release channel for station updates.
//!
//! Versions compare numerically segment by segment, so "3.10.0" is newer
//! than "3.9.0". A non-numeric segment compares as zero.

use crate::{
    entities::{Release, release},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, SqlErr, prelude::*};
use std::cmp::Ordering;
use tracing::info;

/// What a station is told when it asks for updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    /// Whether a newer version exists
    pub update_available: bool,
    /// Newest published version
    pub latest_version: Option<String>,
    /// Changelog of the newest version
    pub changelog: Option<String>,
    /// Whether the station must install before continuing
    pub is_mandatory: bool,
}

/// Compares two dotted version strings numerically per segment.
///
/// Missing segments count as zero, so "3.1" equals "3.1.0".
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| -> Vec<u64> {
        s.split('.')
            .map(|seg| seg.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };
    let va = parse(a);
    let vb = parse(b);
    let len = va.len().max(vb.len());
    for i in 0..len {
        let x = va.get(i).copied().unwrap_or(0);
        let y = vb.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Publishes a release. Versions are unique; republishing one fails.
///
/// # Errors
/// Returns `InvalidInput` for a blank version or `DuplicateVersion` when
/// the version already exists.
pub async fn publish_release(
    db: &DatabaseConnection,
    version: &str,
    changelog: Option<&str>,
    is_mandatory: bool,
) -> Result<release::Model> {
    if version.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Release version must not be empty".to_string(),
        });
    }
    // A version with no numeric segment would sort as 0.0.0 forever
    if !version.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidInput {
            message: format!("Release version is not numeric: {version}"),
        });
    }

    let model = release::ActiveModel {
        version: Set(version.to_string()),
        changelog: Set(changelog.map(ToString::to_string)),
        is_mandatory: Set(is_mandatory),
        released_at: Set(Utc::now()),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(created) => {
            info!(version, is_mandatory, "Published release");
            Ok(created)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(Error::DuplicateVersion {
                version: version.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns the newest published release by version number.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn latest_release(db: &DatabaseConnection) -> Result<Option<release::Model>> {
    let releases = Release::find().all(db).await?;
    Ok(releases
        .into_iter()
        .max_by(|a, b| compare_versions(&a.version, &b.version)))
}

/// Answers a station's update poll against its current version.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn check_for_update(
    db: &DatabaseConnection,
    current_version: &str,
) -> Result<UpdateCheck> {
    let Some(latest) = latest_release(db).await? else {
        return Ok(UpdateCheck {
            update_available: false,
            latest_version: None,
            changelog: None,
            is_mandatory: false,
        });
    };

    let newer = compare_versions(&latest.version, current_version) == Ordering::Greater;
    Ok(UpdateCheck {
        update_available: newer,
        latest_version: Some(latest.version),
        changelog: latest.changelog,
        is_mandatory: newer && latest.is_mandatory,
    })
}

/// Lists recent releases, newest publication first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_releases(db: &DatabaseConnection, limit: u64) -> Result<Vec<release::Model>> {
    Release::find()
        .order_by_desc(release::Column::ReleasedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
