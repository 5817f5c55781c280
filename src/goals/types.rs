//! Fitness goal type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fitness goal measured against synced workouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessGoal {
    /// Unique identifier
    pub id: Uuid,
    /// What is being accumulated
    pub goal_type: GoalType,
    /// Only count activities of this type (e.g. "Run"), all when `None`
    pub activity_type: Option<String>,
    /// Narrower sport filter (e.g. "TrailRun")
    pub sport_type: Option<String>,
    /// Value to reach, in `unit`
    pub target_value: f64,
    /// Last computed progress. A cache only; recomputed on every read.
    pub current_value: f64,
    /// Unit of `target_value`: "km", "mi", "hours", "minutes", "ft", "activities", ...
    pub unit: String,
    /// Window the goal is measured over
    pub time_period: TimePeriod,
    pub start_date: DateTime<Utc>,
    /// Open-ended goals run until now
    pub end_date: Option<DateTime<Utc>>,
    pub status: GoalStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FitnessGoal {
    /// Create a new active goal.
    pub fn new(
        goal_type: GoalType,
        target_value: f64,
        unit: impl Into<String>,
        time_period: TimePeriod,
        start_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            goal_type,
            activity_type: None,
            sport_type: None,
            target_value,
            current_value: 0.0,
            unit: unit.into(),
            time_period,
            start_date,
            end_date: None,
            status: GoalStatus::Active,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Restrict the goal to one activity type.
    pub fn for_activity(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }

    /// Set an explicit end date.
    pub fn ending(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// End of the measurement window.
    pub fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end_date.unwrap_or(now)
    }
}

/// Quantity a goal accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Total distance
    Distance,
    /// Number of activities
    Frequency,
    /// Total moving time
    Duration,
    /// Total elevation gain
    Elevation,
    /// Tracked manually; progress is always zero
    Custom,
}

impl GoalType {
    /// Get display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            GoalType::Distance => "Distance",
            GoalType::Frequency => "Frequency",
            GoalType::Duration => "Duration",
            GoalType::Elevation => "Elevation",
            GoalType::Custom => "Custom",
        }
    }

    /// Storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Distance => "distance",
            GoalType::Frequency => "frequency",
            GoalType::Duration => "duration",
            GoalType::Elevation => "elevation",
            GoalType::Custom => "custom",
        }
    }

    /// Parse a storage key.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "distance" => Some(GoalType::Distance),
            "frequency" => Some(GoalType::Frequency),
            "duration" => Some(GoalType::Duration),
            "elevation" => Some(GoalType::Elevation),
            "custom" => Some(GoalType::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Goal time period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Week,
    Month,
    Year,
    /// Explicit start and end dates
    Custom,
}

impl TimePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
            TimePeriod::Year => "year",
            TimePeriod::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "week" => Some(TimePeriod::Week),
            "month" => Some(TimePeriod::Month),
            "year" => Some(TimePeriod::Year),
            "custom" => Some(TimePeriod::Custom),
            _ => None,
        }
    }

    /// Whether goals with this period must carry an end date.
    pub fn requires_end_date(&self) -> bool {
        matches!(self, TimePeriod::Custom)
    }
}

/// Status of a fitness goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Goal is active and being tracked
    Active,
    /// Goal has been achieved
    Completed,
    /// Goal was abandoned
    Abandoned,
}

impl GoalStatus {
    /// Whether the goal is still being actively tracked.
    pub fn is_active(&self) -> bool {
        matches!(self, GoalStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(GoalStatus::Active),
            "completed" => Some(GoalStatus::Completed),
            "abandoned" => Some(GoalStatus::Abandoned),
            _ => None,
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GoalStatus::Active => "Active",
            GoalStatus::Completed => "Completed",
            GoalStatus::Abandoned => "Abandoned",
        };
        write!(f, "{}", name)
    }
}

/// Result of a progress computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Accumulated value in the goal's unit, rounded to 2 decimals
    pub current_value: f64,
    /// Percent complete, capped at 100 and rounded to 1 decimal
    pub percentage: f64,
    /// Amount left to reach the target, never negative
    pub remaining: f64,
}

impl GoalProgress {
    /// Whether the target has been reached.
    pub fn is_complete(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// A goal together with its freshly computed progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWithProgress {
    pub goal: FitnessGoal,
    pub progress: GoalProgress,
}
