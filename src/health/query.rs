//! Log filtering, incident listing and tag vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::incidents::{group_into_incidents, GroupingOutcome};
use super::types::{HealthLogRecord, LogStatus};

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSortField {
    #[default]
    Timestamp,
    PainLevel,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort and page over legacy log entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFilter {
    pub id: Option<Uuid>,
    pub issue_type: Option<String>,
    pub incident_key: Option<String>,
    pub body_area: Option<String>,
    pub status: Option<LogStatus>,
    pub pain_level_min: Option<u8>,
    pub pain_level_max: Option<u8>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_by: LogSortField,
    pub sort_order: SortOrder,
    pub skip: usize,
    pub limit: usize,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            id: None,
            issue_type: None,
            incident_key: None,
            body_area: None,
            status: None,
            pain_level_min: None,
            pain_level_max: None,
            start_date: None,
            end_date: None,
            sort_by: LogSortField::default(),
            sort_order: SortOrder::default(),
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of matching records plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPage {
    pub records: Vec<HealthLogRecord>,
    pub total: usize,
}

impl LogFilter {
    /// Whether `record` passes every set criterion.
    ///
    /// Date bounds are inclusive; a record without a timestamp never passes a
    /// date bound.
    pub fn matches(&self, record: &HealthLogRecord) -> bool {
        if self.id.map_or(false, |id| id != record.id) {
            return false;
        }
        if !eq_opt(&self.issue_type, &record.issue_type)
            || !eq_opt(&self.body_area, &record.body_area)
        {
            return false;
        }
        if let Some(ref key) = self.incident_key {
            if record.incident_key.as_deref() != Some(key.as_str()) {
                return false;
            }
        }
        if self.status.map_or(false, |s| s != record.status) {
            return false;
        }
        if self.pain_level_min.map_or(false, |min| record.pain_level < min)
            || self.pain_level_max.map_or(false, |max| record.pain_level > max)
        {
            return false;
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(ts) = record.timestamp else {
                return false;
            };
            if self.start_date.map_or(false, |start| ts < start)
                || self.end_date.map_or(false, |end| ts > end)
            {
                return false;
            }
        }
        true
    }

    fn compare(&self, a: &HealthLogRecord, b: &HealthLogRecord) -> Ordering {
        let ordering = match self.sort_by {
            LogSortField::Timestamp => a.timestamp.cmp(&b.timestamp),
            LogSortField::PainLevel => a.pain_level.cmp(&b.pain_level),
            LogSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter, sort and page `records`.
    pub fn apply(&self, records: &[HealthLogRecord]) -> LogPage {
        let mut matching: Vec<&HealthLogRecord> =
            records.iter().filter(|r| self.matches(r)).collect();
        let total = matching.len();

        matching.sort_by(|a, b| self.compare(a, b));

        LogPage {
            records: matching
                .into_iter()
                .skip(self.skip)
                .take(self.limit)
                .cloned()
                .collect(),
            total,
        }
    }
}

fn eq_opt(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |w| w == actual)
}

/// Incident listing parameters. Filters apply to individual log entries
/// before grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentQuery {
    pub issue_type: Option<String>,
    pub status: Option<LogStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl Default for IncidentQuery {
    fn default() -> Self {
        Self {
            issue_type: None,
            status: None,
            start_date: None,
            end_date: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl IncidentQuery {
    /// Group matching entries and keep the `limit` most recent incidents.
    pub fn run(&self, records: &[HealthLogRecord]) -> GroupingOutcome {
        let filter = LogFilter {
            issue_type: self.issue_type.clone(),
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            ..Default::default()
        };
        let matching: Vec<HealthLogRecord> =
            records.iter().filter(|r| filter.matches(r)).cloned().collect();

        let mut outcome = group_into_incidents(&matching);
        outcome.incidents.truncate(self.limit);
        outcome
    }
}

/// Distinct values seen across all log entries, for autocomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogVocabulary {
    pub issue_types: BTreeSet<String>,
    pub body_areas: BTreeSet<String>,
    pub symptoms: BTreeSet<String>,
    pub triggers: BTreeSet<String>,
    pub activities: BTreeSet<String>,
}

impl LogVocabulary {
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a HealthLogRecord>) -> Self {
        fn add(set: &mut BTreeSet<String>, value: &str) {
            if !value.is_empty() {
                set.insert(value.to_string());
            }
        }

        let mut vocab = Self::default();
        for record in records {
            add(&mut vocab.issue_types, &record.issue_type);
            add(&mut vocab.body_areas, &record.body_area);
            record.symptoms.iter().for_each(|s| add(&mut vocab.symptoms, s));
            record.triggers.iter().for_each(|s| add(&mut vocab.triggers, s));
            record.activities.iter().for_each(|s| add(&mut vocab.activities, s));
        }
        vocab
    }
}
