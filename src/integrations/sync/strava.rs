//! Strava API client.
//!
//! Covers the OAuth token endpoints and the read-only activity endpoints the
//! workout cache needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{StravaApi, SyncError};
use crate::workouts::Workout;

/// Default API base URL.
const DEFAULT_API_URL: &str = "https://www.strava.com/api/v3";

/// Default OAuth base URL.
const DEFAULT_OAUTH_URL: &str = "https://www.strava.com/oauth";

/// Strava rejects larger pages.
pub const MAX_PER_PAGE: u32 = 200;

/// Activity as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StravaActivity {
    pub id: i64,
    pub athlete: AthleteRef,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub sport_type: String,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    #[serde(default)]
    pub timezone: Option<String>,
    /// meters
    pub distance: f64,
    /// seconds
    pub moving_time: u32,
    /// seconds
    pub elapsed_time: u32,
    /// meters
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub commute: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteRef {
    pub id: i64,
}

/// Authenticated athlete profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StravaAthlete {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub premium: bool,
}

/// Body of a successful `/oauth/token` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
    #[serde(default)]
    pub athlete: Option<StravaAthlete>,
}

/// Paging and time window for listing activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityQuery {
    pub page: u32,
    pub per_page: u32,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            after: None,
            before: None,
        }
    }
}

impl ActivityQuery {
    /// Query string pairs, with `per_page` capped at [`MAX_PER_PAGE`].
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("per_page", self.per_page.clamp(1, MAX_PER_PAGE).to_string()),
        ];
        if let Some(after) = self.after {
            params.push(("after", after.timestamp().to_string()));
        }
        if let Some(before) = self.before {
            params.push(("before", before.timestamp().to_string()));
        }
        params
    }
}

/// Convert an API activity into the cached workout shape.
pub fn convert_activity_to_workout(activity: &StravaActivity, now: DateTime<Utc>) -> Workout {
    let mut workout = Workout::new(activity.id, activity.activity_type.clone(), activity.start_date);
    workout.athlete_id = activity.athlete.id;
    workout.name = activity.name.clone();
    workout.sport_type = activity.sport_type.clone();
    workout.start_date_local = activity.start_date_local;
    workout.distance = activity.distance;
    workout.moving_time = activity.moving_time;
    workout.elapsed_time = activity.elapsed_time;
    workout.total_elevation_gain = activity.total_elevation_gain;
    workout.average_speed = activity.average_speed;
    workout.max_speed = activity.max_speed;
    workout.average_heartrate = activity.average_heartrate;
    workout.max_heartrate = activity.max_heartrate;
    workout.calories = activity.calories;
    workout.device_name = activity.device_name.clone();
    workout.description = activity.description.clone();
    workout.trainer = activity.trainer;
    workout.commute = activity.commute;
    workout.sync_date = now;
    workout.created_at = now;
    workout.updated_at = now;
    workout
}

/// Strava API client.
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a client for the public Strava endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self, SyncError> {
        Self::with_base_urls(client_id, client_secret, DEFAULT_API_URL, DEFAULT_OAUTH_URL)
    }

    /// Create a client with custom base URLs.
    pub fn with_base_urls(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_url: impl Into<String>,
        oauth_url: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            oauth_url: oauth_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SyncError> {
        tracing::info!("Exchanging Strava authorization code");
        let body = serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "code": code,
            "grant_type": "authorization_code",
        });
        self.post_token(&body).await
    }

    /// Fetch the authenticated athlete.
    pub async fn get_athlete(&self, access_token: &str) -> Result<StravaAthlete, SyncError> {
        let url = format!("{}/athlete", self.api_url);
        self.get_json(&url, access_token, &[]).await
    }

    /// Fetch a single activity.
    pub async fn get_activity(&self, access_token: &str, id: i64) -> Result<StravaActivity, SyncError> {
        let url = format!("{}/activities/{}", self.api_url, id);
        self.get_json(&url, access_token, &[]).await
    }

    async fn post_token(&self, body: &serde_json::Value) -> Result<TokenResponse, SyncError> {
        let url = format!("{}/token", self.oauth_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn get_json<R: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&'static str, String)],
    ) -> Result<R, SyncError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn parse_response<R: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<R, SyncError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| SyncError::SerializationError(e.to_string()))
        } else if status.as_u16() == 401 {
            Err(SyncError::AuthorizationRequired)
        } else if status.as_u16() == 429 {
            Err(SyncError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(SyncError::ApiError(format!("status {}: {}", status, message)))
        }
    }
}

impl StravaApi for StravaClient {
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SyncError> {
        tracing::info!("Refreshing Strava access token");
        let body = serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });
        self.post_token(&body)
            .await
            .map_err(|e| SyncError::RefreshFailed(e.to_string()))
    }

    async fn list_activities(
        &self,
        access_token: &str,
        query: &ActivityQuery,
    ) -> Result<Vec<StravaActivity>, SyncError> {
        let url = format!("{}/athlete/activities", self.api_url);
        self.get_json(&url, access_token, &query.params()).await
    }
}
