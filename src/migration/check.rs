//! Read-only pre-migration check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::ExistingOutput;
use crate::health::incidents::partition;
use crate::health::{DataQualityIssue, HealthLogRecord};

/// Per-incident line of the check report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentBreakdown {
    pub incident_key: String,
    pub log_count: usize,
    pub first_date: DateTime<Utc>,
    pub last_date: DateTime<Utc>,
    /// Body area of the earliest entry, `"unknown"` when blank
    pub body_area: String,
}

/// Result of validating the legacy collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub total_records: usize,
    pub missing_incident_key: Vec<Uuid>,
    pub missing_timestamp: Vec<Uuid>,
    /// One line per incident that would be created, in first-seen order
    pub breakdown: Vec<IncidentBreakdown>,
    pub existing_output: ExistingOutput,
}

impl CheckReport {
    /// Build the report for `logs`.
    pub fn build(logs: &[HealthLogRecord], existing_output: ExistingOutput) -> Self {
        let (groups, warnings) = partition(logs);

        let mut report = CheckReport {
            total_records: logs.len(),
            existing_output,
            ..Default::default()
        };

        for warning in warnings {
            match warning.issue {
                DataQualityIssue::MissingIncidentKey => {
                    report.missing_incident_key.push(warning.record_id)
                }
                DataQualityIssue::MissingTimestamp => report.missing_timestamp.push(warning.record_id),
            }
        }

        // A record missing both fields is reported once, as missing its key.
        // Count it under timestamps too so both totals are exact.
        for record in logs {
            if record.key().is_none() && record.timestamp.is_none() {
                report.missing_timestamp.push(record.id);
            }
        }

        report.breakdown = groups
            .into_iter()
            .filter_map(|(key, records)| {
                let first = records.first()?;
                let last = records.last()?;
                let body_area = if first.body_area.is_empty() {
                    "unknown".to_string()
                } else {
                    first.body_area.clone()
                };
                Some(IncidentBreakdown {
                    incident_key: key.to_string(),
                    log_count: records.len(),
                    first_date: first.timestamp?,
                    last_date: last.timestamp?,
                    body_area,
                })
            })
            .collect();

        report
    }

    /// True when every record can be migrated.
    pub fn passed(&self) -> bool {
        self.missing_incident_key.is_empty() && self.missing_timestamp.is_empty()
    }

    pub fn invalid_count(&self) -> usize {
        self.missing_incident_key.len() + self.missing_timestamp.len()
    }

    pub fn incident_count(&self) -> usize {
        self.breakdown.len()
    }

    /// Log the report the way an operator reads it.
    pub fn log_summary(&self) {
        tracing::info!("Found {} legacy health logs", self.total_records);

        if self.existing_output.incidents > 0 {
            tracing::warn!(
                "health_incidents already contains {} rows",
                self.existing_output.incidents
            );
        }
        if self.existing_output.backup > 0 {
            tracing::warn!(
                "health_logs_backup already contains {} rows",
                self.existing_output.backup
            );
        }

        for line in &self.breakdown {
            tracing::info!(
                "  {}: {} log(s), body area {}, {} to {}",
                line.incident_key,
                line.log_count,
                line.body_area,
                line.first_date.format("%Y-%m-%d"),
                line.last_date.format("%Y-%m-%d")
            );
        }

        if !self.missing_incident_key.is_empty() {
            tracing::warn!("{} logs missing incident key", self.missing_incident_key.len());
        }
        if !self.missing_timestamp.is_empty() {
            tracing::warn!("{} logs missing timestamp", self.missing_timestamp.len());
        }

        if self.passed() {
            tracing::info!("Pre-check passed: {} incidents to create", self.incident_count());
        } else {
            tracing::warn!("Pre-check failed: {} invalid records", self.invalid_count());
        }
    }
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records checked, {} missing incident key, {} missing timestamp",
            self.total_records,
            self.missing_incident_key.len(),
            self.missing_timestamp.len()
        )
    }
}
