//! Strava OAuth credentials.
//!
//! Credentials are a plain value passed to whoever needs them. Callers refresh
//! them with [`ensure_fresh`] before use and persist the result themselves.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::strava::TokenResponse;
use super::{StravaApi, SyncError};

/// Access and refresh tokens for one athlete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StravaCredentials {
    pub athlete_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl StravaCredentials {
    /// Build credentials from a token response.
    ///
    /// Refresh responses omit the athlete, so `athlete_id` is used when the
    /// response has none.
    pub fn from_token_response(tokens: TokenResponse, athlete_id: i64) -> Result<Self, SyncError> {
        let expires_at = Utc
            .timestamp_opt(tokens.expires_at, 0)
            .single()
            .ok_or_else(|| SyncError::ApiError(format!("invalid expires_at {}", tokens.expires_at)))?;

        Ok(Self {
            athlete_id: tokens.athlete.map(|a| a.id).unwrap_or(athlete_id),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at,
        })
    }

    /// True when the access token expires within `margin` of `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at <= now + margin
    }
}

/// Refresh `credentials` in place if they are about to expire.
///
/// Returns whether a refresh happened.
pub async fn ensure_fresh<A: StravaApi>(
    api: &A,
    credentials: &mut StravaCredentials,
    now: DateTime<Utc>,
    margin: Duration,
) -> Result<bool, SyncError> {
    if !credentials.needs_refresh(now, margin) {
        return Ok(false);
    }

    tracing::info!(
        "Access token for athlete {} expires at {}, refreshing",
        credentials.athlete_id,
        credentials.expires_at
    );

    let tokens = api.refresh_token(&credentials.refresh_token).await?;
    *credentials = StravaCredentials::from_token_response(tokens, credentials.athlete_id)?;

    Ok(true)
}
