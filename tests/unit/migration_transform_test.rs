//! Unit tests for converting flat logs into incidents and linked logs.

use chrono::{DateTime, TimeZone, Utc};
use healthlog::health::{HealthLogRecord, IncidentStatusFlags, LogStatus, NormalizedIssueType};
use healthlog::migration::transform;

fn t(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, day, hour, 0, 0).unwrap()
}

fn log(key: &str, at: DateTime<Utc>, pain: u8, status: LogStatus, area: &str) -> HealthLogRecord {
    let mut record = HealthLogRecord::new(key, at, pain);
    record.status = status;
    record.body_area = area.to_string();
    record.description = format!("{} at {}", key, at.format("%H:%M"));
    record
}

#[test]
fn test_one_incident_per_key() {
    let logs = vec![
        log("back", t(1, 8), 3, LogStatus::Active, "lower back"),
        log("knee", t(2, 8), 5, LogStatus::Active, "left knee"),
        log("back", t(1, 14), 7, LogStatus::Resolved, "lower back"),
    ];

    let out = transform(&logs);

    assert_eq!(out.incidents.len(), 2);
    assert_eq!(out.logs.len(), 3);
}

#[test]
fn test_incident_fields_from_first_and_last_entry() {
    let logs = vec![
        log("back", t(1, 14), 7, LogStatus::Improving, "upper back"),
        log("back", t(1, 8), 3, LogStatus::Active, "lower back"),
    ];

    let out = transform(&logs);
    let incident = &out.incidents[0];

    assert_eq!(incident.date_started, t(1, 8));
    assert_eq!(incident.pain_intensity, 3);
    assert_eq!(incident.pain_locations, vec!["lower back".to_string()]);
    assert_eq!(incident.description, "back at 08:00");
    assert!(incident.injury_source.is_empty());
    assert_eq!(incident.status, IncidentStatusFlags::from_latest(LogStatus::Improving));
    assert!(incident.status.improving);
    assert!(incident.symptoms.status.constant);
    assert!(!incident.symptoms.pain_quality.sharp);
}

#[test]
fn test_active_latest_status_means_worsening() {
    let out = transform(&[log("ankle", t(3, 9), 4, LogStatus::Active, "ankle")]);

    let status = out.incidents[0].status;
    assert!(status.worsening);
    assert!(!status.resolved && !status.improving && !status.constant && !status.occasional);
}

#[test]
fn test_logs_keep_identity_and_link_to_incident() {
    let logs = vec![
        log("back", t(1, 8), 3, LogStatus::Active, "lower back"),
        log("back", t(1, 14), 7, LogStatus::Resolved, "lower back"),
    ];

    let out = transform(&logs);
    let incident_id = out.incidents[0].id;

    for (converted, original) in out.logs.iter().zip(&logs) {
        assert_eq!(converted.id, original.id);
        assert_eq!(converted.timestamp, original.timestamp.unwrap());
        assert_eq!(converted.incident_id, incident_id);
        assert_eq!(converted.issue_type, NormalizedIssueType::Update);
        assert_eq!(converted.description, original.description);
    }
}

#[test]
fn test_empty_body_area_gives_no_locations() {
    let out = transform(&[log("misc", t(4, 9), 2, LogStatus::Active, "")]);
    assert!(out.incidents[0].pain_locations.is_empty());
}

#[test]
fn test_empty_input() {
    let out = transform(&[]);
    assert!(out.incidents.is_empty());
    assert!(out.logs.is_empty());
}
