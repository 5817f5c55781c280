//! Unit tests for grouping health logs into incidents.

use chrono::{DateTime, Duration, TimeZone, Utc};
use healthlog::health::{group_into_incidents, DataQualityIssue, HealthLogRecord, LogStatus};

fn t(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, day, hour, 0, 0).unwrap()
}

fn log(key: &str, at: DateTime<Utc>, pain: u8, status: LogStatus) -> HealthLogRecord {
    let mut record = HealthLogRecord::new(key, at, pain);
    record.status = status;
    record.issue_type = "injury".to_string();
    record
}

#[test]
fn test_back_incident_summary() {
    let mut first = log("back_2024_12_001", t(1, 8), 3, LogStatus::Active);
    first.symptoms = vec!["stiffness".to_string()];
    first.activities = vec!["deadlift".to_string()];
    let mut second = log("back_2024_12_001", t(1, 14), 7, LogStatus::Resolved);
    second.symptoms = vec!["stiffness".to_string(), "sharp pain".to_string()];
    second.triggers = vec!["bending".to_string()];

    let outcome = group_into_incidents(&[first, second]);

    assert_eq!(outcome.incidents.len(), 1);
    let incident = &outcome.incidents[0];
    assert_eq!(incident.incident_key, "back_2024_12_001");
    assert_eq!(incident.issue_type, "injury");
    assert_eq!(incident.log_count, 2);
    assert_eq!(incident.duration_hours, 6.0);
    assert_eq!(incident.max_pain_level, 7);
    assert_eq!(incident.avg_pain_level, 5.0);
    assert_eq!(incident.status, LogStatus::Resolved);
    assert_eq!(incident.all_symptoms.len(), 2);
    assert!(incident.all_activities.contains("deadlift"));
    assert!(incident.all_triggers.contains("bending"));
}

#[test]
fn test_average_rounded_to_one_decimal() {
    let logs = vec![
        log("knee", t(2, 8), 3, LogStatus::Active),
        log("knee", t(2, 9), 4, LogStatus::Active),
        log("knee", t(2, 10), 4, LogStatus::Improving),
    ];

    let outcome = group_into_incidents(&logs);

    assert_eq!(outcome.incidents[0].avg_pain_level, 3.7);
    assert_eq!(outcome.incidents[0].status, LogStatus::Improving);
}

#[test]
fn test_incidents_sorted_newest_first() {
    let logs = vec![
        log("old", t(1, 8), 2, LogStatus::Resolved),
        log("new", t(5, 8), 5, LogStatus::Active),
        log("middle", t(3, 8), 4, LogStatus::Active),
    ];

    let outcome = group_into_incidents(&logs);

    let keys: Vec<&str> = outcome.incidents.iter().map(|i| i.incident_key.as_str()).collect();
    assert_eq!(keys, vec!["new", "middle", "old"]);
}

#[test]
fn test_status_from_latest_entry_regardless_of_input_order() {
    let logs = vec![
        log("shoulder", t(4, 18), 2, LogStatus::Resolved),
        log("shoulder", t(4, 8), 6, LogStatus::Active),
    ];

    let outcome = group_into_incidents(&logs);

    assert_eq!(outcome.incidents[0].first_log, t(4, 8));
    assert_eq!(outcome.incidents[0].status, LogStatus::Resolved);
}

#[test]
fn test_keys_are_case_sensitive() {
    let logs = vec![
        log("Back_Pain", t(1, 8), 3, LogStatus::Active),
        log("back_pain", t(1, 9), 3, LogStatus::Active),
    ];

    assert_eq!(group_into_incidents(&logs).incidents.len(), 2);
}

#[test]
fn test_malformed_entries_reported_not_grouped() {
    let mut no_key = log("", t(1, 8), 3, LogStatus::Active);
    no_key.incident_key = None;
    let mut empty_key = log("", t(1, 9), 3, LogStatus::Active);
    empty_key.incident_key = Some(String::new());
    let mut no_time = log("ankle", t(1, 10), 3, LogStatus::Active);
    no_time.timestamp = None;
    let valid = log("ankle", t(1, 11), 5, LogStatus::Active);

    let outcome = group_into_incidents(&[no_key.clone(), empty_key, no_time.clone(), valid]);

    assert_eq!(outcome.incidents.len(), 1);
    assert_eq!(outcome.incidents[0].log_count, 1);
    assert_eq!(outcome.warnings.len(), 3);
    assert_eq!(outcome.warnings[0].record_id, no_key.id);
    assert_eq!(outcome.warnings[0].issue, DataQualityIssue::MissingIncidentKey);
    assert_eq!(outcome.warnings[2].record_id, no_time.id);
    assert_eq!(outcome.warnings[2].issue, DataQualityIssue::MissingTimestamp);
}

#[test]
fn test_empty_input() {
    let outcome = group_into_incidents(&[]);
    assert!(outcome.incidents.is_empty());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_multi_day_duration() {
    let start = t(1, 8);
    let logs = vec![
        log("hip", start, 4, LogStatus::Active),
        log("hip", start + Duration::hours(36) + Duration::minutes(30), 2, LogStatus::Improving),
    ];

    assert_eq!(group_into_incidents(&logs).incidents[0].duration_hours, 36.5);
}
