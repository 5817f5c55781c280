//! Strava activity sync.
//!
//! Exchanges and refreshes OAuth tokens and copies activities into the local
//! workout cache.

pub mod activities;
pub mod credentials;
pub mod strava;

use thiserror::Error;

use crate::storage::DatabaseError;

// Re-export main types
pub use activities::{sync_activities, SyncSummary};
pub use credentials::{ensure_fresh, StravaCredentials};
pub use strava::{
    convert_activity_to_workout, ActivityQuery, StravaActivity, StravaAthlete, StravaClient,
    TokenResponse,
};

/// Sync-related errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Strava is not configured: {0}")]
    NotConfigured(String),

    #[error("Authorization required")]
    AuthorizationRequired,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Rate limited by Strava")]
    RateLimited,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Strava endpoints the sync depends on.
pub trait StravaApi: Send + Sync {
    /// Trade a refresh token for new tokens
    fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<TokenResponse, SyncError>> + Send;

    /// One page of the athlete's activities, newest first
    fn list_activities(
        &self,
        access_token: &str,
        query: &ActivityQuery,
    ) -> impl std::future::Future<Output = Result<Vec<StravaActivity>, SyncError>> + Send;
}
