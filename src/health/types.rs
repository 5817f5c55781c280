//! Health log and incident type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Lowest and highest accepted pain level.
pub const PAIN_LEVEL_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// A flat, legacy health log entry.
///
/// Grouping is by `incident_key`, a free-text label chosen by the user. Both
/// `incident_key` and `timestamp` are optional here so that malformed rows can
/// still be loaded and reported instead of failing the whole read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthLogRecord {
    pub id: Uuid,
    pub timestamp: Option<DateTime<Utc>>,
    pub incident_key: Option<String>,
    pub pain_level: u8,
    pub body_area: String,
    pub issue_type: String,
    pub description: String,
    pub status: LogStatus,
    pub activities: Vec<String>,
    pub triggers: Vec<String>,
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthLogRecord {
    /// Create a record with empty tags and `active` status.
    pub fn new(incident_key: impl Into<String>, timestamp: DateTime<Utc>, pain_level: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Some(timestamp),
            incident_key: Some(incident_key.into()),
            pain_level,
            body_area: String::new(),
            issue_type: String::new(),
            description: String::new(),
            status: LogStatus::Active,
            activities: Vec::new(),
            triggers: Vec::new(),
            symptoms: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// The grouping key, treating an empty string as missing.
    pub fn key(&self) -> Option<&str> {
        self.incident_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Legacy status of a single log entry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    #[default]
    Active,
    Improving,
    Resolved,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Active => "active",
            LogStatus::Improving => "improving",
            LogStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(LogStatus::Active),
            "improving" => Some(LogStatus::Improving),
            "resolved" => Some(LogStatus::Resolved),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate view over all log entries sharing one incident key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub incident_key: String,
    /// Issue type of the earliest entry
    pub issue_type: String,
    pub first_log: DateTime<Utc>,
    pub last_log: DateTime<Utc>,
    pub duration_hours: f64,
    pub log_count: usize,
    pub max_pain_level: u8,
    /// Rounded to 1 decimal
    pub avg_pain_level: f64,
    /// Status of the chronologically last entry
    pub status: LogStatus,
    pub all_symptoms: BTreeSet<String>,
    pub all_activities: BTreeSet<String>,
    pub all_triggers: BTreeSet<String>,
}

/// Request to write a new legacy log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHealthLog {
    pub issue_type: String,
    pub pain_level: Option<u8>,
    pub description: String,
    pub incident_key: String,
    pub body_area: String,
    pub status: Option<LogStatus>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl NewHealthLog {
    /// Check required fields and build the record to store.
    ///
    /// A missing status defaults to `active`, a missing timestamp to `now`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<HealthLogRecord, LogValidationError> {
        let required = [
            ("issue_type", &self.issue_type),
            ("description", &self.description),
            ("incident_key", &self.incident_key),
            ("body_area", &self.body_area),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(LogValidationError::MissingField(field));
            }
        }

        let pain_level = self
            .pain_level
            .ok_or(LogValidationError::MissingField("pain_level"))?;
        if !PAIN_LEVEL_RANGE.contains(&pain_level) {
            return Err(LogValidationError::PainLevelOutOfRange(pain_level));
        }

        Ok(HealthLogRecord {
            id: Uuid::new_v4(),
            timestamp: Some(self.timestamp.unwrap_or(now)),
            incident_key: Some(self.incident_key),
            pain_level,
            body_area: self.body_area,
            issue_type: self.issue_type,
            description: self.description,
            status: self.status.unwrap_or_default(),
            activities: self.activities,
            triggers: self.triggers,
            symptoms: self.symptoms,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Rejected log entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Pain level must be between 1 and 10, got {0}")]
    PainLevelOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> NewHealthLog {
        NewHealthLog {
            issue_type: "injury".to_string(),
            pain_level: Some(6),
            description: "Twinge after deadlifts".to_string(),
            incident_key: "back_2024_12_001".to_string(),
            body_area: "lower back".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_log_status_defaults_to_active() {
        assert_eq!(LogStatus::default(), LogStatus::Active);
    }

    #[test]
    fn test_validate_applies_defaults() {
        let now = Utc::now();
        let record = complete_request().validate(now).unwrap();
        assert_eq!(record.status, LogStatus::Active);
        assert_eq!(record.timestamp, Some(now));
        assert_eq!(record.key(), Some("back_2024_12_001"));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut request = complete_request();
        request.body_area = "  ".to_string();
        assert_eq!(
            request.validate(Utc::now()),
            Err(LogValidationError::MissingField("body_area"))
        );

        let mut request = complete_request();
        request.pain_level = None;
        assert_eq!(
            request.validate(Utc::now()),
            Err(LogValidationError::MissingField("pain_level"))
        );
    }

    #[test]
    fn test_validate_rejects_pain_out_of_range() {
        for level in [0, 11] {
            let mut request = complete_request();
            request.pain_level = Some(level);
            assert_eq!(
                request.validate(Utc::now()),
                Err(LogValidationError::PainLevelOutOfRange(level))
            );
        }
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let mut record = HealthLogRecord::new("", Utc::now(), 3);
        assert_eq!(record.key(), None);
        record.incident_key = None;
        assert_eq!(record.key(), None);
    }

    #[test]
    fn test_status_keys() {
        assert_eq!(LogStatus::parse("improving"), Some(LogStatus::Improving));
        assert_eq!(LogStatus::parse("worse"), None);
        assert_eq!(LogStatus::Resolved.to_string(), "resolved");
    }
}
