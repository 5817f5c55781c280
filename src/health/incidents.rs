//! Incident grouping.
//!
//! Groups flat log entries by their incident key and derives one
//! [`IncidentSummary`] per group. Malformed entries are skipped and reported,
//! never fatal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::types::{HealthLogRecord, IncidentSummary};

/// Milliseconds per hour.
const MS_PER_HOUR: f64 = 3_600_000.0;

/// A record that was left out of grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub record_id: Uuid,
    pub issue: DataQualityIssue,
}

/// What is wrong with an excluded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQualityIssue {
    MissingIncidentKey,
    MissingTimestamp,
}

impl std::fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let issue = match self.issue {
            DataQualityIssue::MissingIncidentKey => "missing incident key",
            DataQualityIssue::MissingTimestamp => "missing timestamp",
        };
        write!(f, "log {} excluded: {}", self.record_id, issue)
    }
}

/// Grouping result: summaries plus the records that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingOutcome {
    /// Most recent incident first
    pub incidents: Vec<IncidentSummary>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Classify a record, returning its key and timestamp when usable.
pub(crate) fn check_record(
    record: &HealthLogRecord,
) -> Result<(&str, DateTime<Utc>), DataQualityWarning> {
    let key = record.key().ok_or(DataQualityWarning {
        record_id: record.id,
        issue: DataQualityIssue::MissingIncidentKey,
    })?;
    let timestamp = record.timestamp.ok_or(DataQualityWarning {
        record_id: record.id,
        issue: DataQualityIssue::MissingTimestamp,
    })?;
    Ok((key, timestamp))
}

/// Partition valid records by exact incident key, each group sorted by
/// timestamp ascending. Groups are returned in first-seen order.
pub(crate) fn partition<'a>(
    logs: &'a [HealthLogRecord],
) -> (Vec<(&'a str, Vec<&'a HealthLogRecord>)>, Vec<DataQualityWarning>) {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&HealthLogRecord>)> = Vec::new();
    let mut warnings = Vec::new();

    for record in logs {
        match check_record(record) {
            Ok((key, _)) => {
                let slot = *index.entry(key).or_insert_with(|| {
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                });
                groups[slot].1.push(record);
            }
            Err(warning) => warnings.push(warning),
        }
    }

    for (_, records) in &mut groups {
        // Stable, so equal timestamps keep input order.
        records.sort_by_key(|r| r.timestamp);
    }

    (groups, warnings)
}

/// Summarize one sorted, non-empty group.
fn summarize(key: &str, records: &[&HealthLogRecord]) -> Option<IncidentSummary> {
    let first = records.first()?;
    let last = records.last()?;
    let first_log = first.timestamp?;
    let last_log = last.timestamp?;

    let mut all_symptoms = BTreeSet::new();
    let mut all_activities = BTreeSet::new();
    let mut all_triggers = BTreeSet::new();
    let mut max_pain_level = 0;
    let mut pain_total = 0u32;

    for record in records {
        max_pain_level = max_pain_level.max(record.pain_level);
        pain_total += u32::from(record.pain_level);
        all_symptoms.extend(record.symptoms.iter().cloned());
        all_activities.extend(record.activities.iter().cloned());
        all_triggers.extend(record.triggers.iter().cloned());
    }

    let avg = f64::from(pain_total) / records.len() as f64;

    Some(IncidentSummary {
        incident_key: key.to_string(),
        issue_type: first.issue_type.clone(),
        first_log,
        last_log,
        duration_hours: (last_log - first_log).num_milliseconds() as f64 / MS_PER_HOUR,
        log_count: records.len(),
        max_pain_level,
        avg_pain_level: (avg * 10.0).round() / 10.0,
        status: last.status,
        all_symptoms,
        all_activities,
        all_triggers,
    })
}

/// Group log entries into incident summaries.
///
/// Entries without an incident key or timestamp are excluded and returned as
/// warnings. Keys are matched exactly, so `"Back_Pain"` and `"back_pain"` are
/// separate incidents.
pub fn group_into_incidents(logs: &[HealthLogRecord]) -> GroupingOutcome {
    let (groups, warnings) = partition(logs);

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let mut incidents: Vec<IncidentSummary> = groups
        .iter()
        .filter_map(|(key, records)| summarize(key, records))
        .collect();

    incidents.sort_by(|a, b| b.first_log.cmp(&a.first_log));

    tracing::debug!(
        "Grouped {} logs into {} incidents ({} excluded)",
        logs.len(),
        incidents.len(),
        warnings.len()
    );

    GroupingOutcome { incidents, warnings }
}
