//! Pulling activities into the local workout cache.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::credentials::{ensure_fresh, StravaCredentials};
use super::strava::{convert_activity_to_workout, ActivityQuery};
use super::{StravaApi, SyncError};
use crate::storage::database::{Database, UpsertOutcome};

/// Counts from one sync call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub fetched: usize,
    pub new: usize,
    pub updated: usize,
}

/// Fetch one page of activities and upsert them by Strava ID.
///
/// Credentials are refreshed first when they expire within `refresh_margin`;
/// refreshed credentials are saved before any activity is fetched.
pub async fn sync_activities<A: StravaApi>(
    api: &A,
    credentials: &mut StravaCredentials,
    db: &Database,
    query: &ActivityQuery,
    refresh_margin: Duration,
) -> Result<SyncSummary, SyncError> {
    if ensure_fresh(api, credentials, Utc::now(), refresh_margin).await? {
        db.save_strava_credentials(credentials)?;
    }

    let activities = api
        .list_activities(&credentials.access_token, query)
        .await?;

    let now = Utc::now();
    let mut summary = SyncSummary {
        fetched: activities.len(),
        ..Default::default()
    };

    for activity in &activities {
        let workout = convert_activity_to_workout(activity, now);
        match db.upsert_workout(&workout)? {
            UpsertOutcome::Inserted => summary.new += 1,
            UpsertOutcome::Updated => summary.updated += 1,
        }
    }

    tracing::info!(
        "Synced {} activities ({} new, {} updated)",
        summary.fetched,
        summary.new,
        summary.updated
    );

    Ok(summary)
}
