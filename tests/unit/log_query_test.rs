//! Unit tests for log filtering, incident listing and vocabulary.

use chrono::{DateTime, TimeZone, Utc};
use healthlog::health::{
    HealthLogRecord, IncidentQuery, LogFilter, LogSortField, LogStatus, LogVocabulary, SortOrder,
};

fn t(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap()
}

fn sample_logs() -> Vec<HealthLogRecord> {
    let mut knee = HealthLogRecord::new("knee_01", t(2), 6);
    knee.issue_type = "injury".to_string();
    knee.body_area = "knee".to_string();
    knee.symptoms = vec!["swelling".to_string()];

    let mut knee_later = HealthLogRecord::new("knee_01", t(6), 3);
    knee_later.issue_type = "injury".to_string();
    knee_later.body_area = "knee".to_string();
    knee_later.status = LogStatus::Improving;

    let mut headache = HealthLogRecord::new("head_01", t(4), 5);
    headache.issue_type = "illness".to_string();
    headache.body_area = "head".to_string();
    headache.triggers = vec!["screen time".to_string()];

    vec![knee, headache, knee_later]
}

#[test]
fn test_filter_by_issue_type_and_pain() {
    let logs = sample_logs();
    let filter = LogFilter {
        issue_type: Some("injury".to_string()),
        pain_level_min: Some(5),
        ..Default::default()
    };

    let page = filter.apply(&logs);

    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].pain_level, 6);
}

#[test]
fn test_default_sort_is_newest_first() {
    let page = LogFilter::default().apply(&sample_logs());

    let days: Vec<_> = page.records.iter().map(|r| r.timestamp).collect();
    assert_eq!(days, vec![Some(t(6)), Some(t(4)), Some(t(2))]);
}

#[test]
fn test_sort_by_pain_and_page() {
    let filter = LogFilter {
        sort_by: LogSortField::PainLevel,
        sort_order: SortOrder::Asc,
        skip: 1,
        limit: 1,
        ..Default::default()
    };

    let page = filter.apply(&sample_logs());

    assert_eq!(page.total, 3);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].pain_level, 5);
}

#[test]
fn test_date_bounds_are_inclusive() {
    let filter = LogFilter {
        start_date: Some(t(4)),
        end_date: Some(t(6)),
        ..Default::default()
    };

    assert_eq!(filter.apply(&sample_logs()).total, 2);
}

#[test]
fn test_incident_query_filters_before_grouping() {
    let query = IncidentQuery {
        status: Some(LogStatus::Active),
        ..Default::default()
    };

    let outcome = query.run(&sample_logs());

    assert_eq!(outcome.incidents.len(), 2);
    let knee = outcome
        .incidents
        .iter()
        .find(|i| i.incident_key == "knee_01")
        .unwrap();
    assert_eq!(knee.log_count, 1);
}

#[test]
fn test_incident_query_limit_keeps_newest() {
    let query = IncidentQuery {
        limit: 1,
        ..Default::default()
    };

    let outcome = query.run(&sample_logs());

    assert_eq!(outcome.incidents.len(), 1);
    assert_eq!(outcome.incidents[0].incident_key, "head_01");
}

#[test]
fn test_vocabulary_collects_distinct_values() {
    let logs = sample_logs();
    let vocabulary = LogVocabulary::collect(&logs);

    assert_eq!(vocabulary.issue_types.len(), 2);
    assert_eq!(vocabulary.body_areas.len(), 2);
    assert!(vocabulary.symptoms.contains("swelling"));
    assert!(vocabulary.triggers.contains("screen time"));
    assert!(vocabulary.activities.is_empty());
}
