//! Cached workout type definitions.
//!
//! A `Workout` is the local copy of a Strava activity, trimmed to what the
//! dashboards and goal progress need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A synced activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Local identifier
    pub id: Uuid,
    /// Strava activity ID (unique)
    pub strava_id: i64,
    /// Owning Strava athlete
    pub athlete_id: i64,
    /// Activity name
    pub name: String,
    /// Activity type, e.g. "Run", "Ride"
    pub activity_type: String,
    /// More specific sport, e.g. "TrailRun"
    pub sport_type: String,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u32,
    /// Elapsed time in seconds
    pub elapsed_time: u32,
    /// Elevation gain in meters
    pub total_elevation_gain: f64,
    /// m/s
    pub average_speed: Option<f64>,
    /// m/s
    pub max_speed: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub calories: Option<f64>,
    pub device_name: Option<String>,
    pub description: Option<String>,
    pub trainer: bool,
    pub commute: bool,
    /// When this activity was last pulled from Strava
    pub sync_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// Create a workout with the fields goal progress depends on; everything
    /// else is empty.
    pub fn new(strava_id: i64, activity_type: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        let activity_type = activity_type.into();
        Self {
            id: Uuid::new_v4(),
            strava_id,
            athlete_id: 0,
            name: String::new(),
            sport_type: activity_type.clone(),
            activity_type,
            start_date,
            start_date_local: start_date,
            distance: 0.0,
            moving_time: 0,
            elapsed_time: 0,
            total_elevation_gain: 0.0,
            average_speed: None,
            max_speed: None,
            average_heartrate: None,
            max_heartrate: None,
            calories: None,
            device_name: None,
            description: None,
            trainer: false,
            commute: false,
            sync_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style distance setter (meters).
    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance = meters;
        self
    }

    /// Builder-style moving time setter (seconds).
    pub fn with_moving_time(mut self, seconds: u32) -> Self {
        self.moving_time = seconds;
        self.elapsed_time = self.elapsed_time.max(seconds);
        self
    }

    /// Builder-style elevation setter (meters).
    pub fn with_elevation(mut self, meters: f64) -> Self {
        self.total_elevation_gain = meters;
        self
    }

    /// Builder-style sport type setter.
    pub fn with_sport_type(mut self, sport_type: impl Into<String>) -> Self {
        self.sport_type = sport_type.into();
        self
    }
}
