//! Integration tests for the flat-log to incident migration over SQLite.

use chrono::{DateTime, Duration, TimeZone, Utc};
use healthlog::health::{HealthLogRecord, LogStatus, NormalizedIssueType};
use healthlog::migration::{
    MigrationEngine, MigrationError, MigrationOptions, MigrationOutcome, MigrationStep,
};
use healthlog::storage::Database;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 1, 8, 0, 0).unwrap()
}

fn log(key: &str, hours: i64, pain: u8, status: LogStatus) -> HealthLogRecord {
    let mut record = HealthLogRecord::new(key, base() + Duration::hours(hours), pain);
    record.status = status;
    record.issue_type = "injury".to_string();
    record.body_area = "lower back".to_string();
    record.description = format!("{} +{}h", key, hours);
    record
}

/// Two incidents: "back" with two entries, "knee" with one.
fn seeded_database() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.insert_health_log(&log("back", 0, 3, LogStatus::Active)).unwrap();
    db.insert_health_log(&log("back", 6, 7, LogStatus::Resolved)).unwrap();
    db.insert_health_log(&log("knee", 24, 5, LogStatus::Improving)).unwrap();
    db
}

fn run(db: &mut Database, dry_run: bool, check_only: bool) -> Result<healthlog::migration::MigrationReport, MigrationError> {
    MigrationEngine::new(db, MigrationOptions { dry_run, check_only }).run()
}

#[test]
fn test_full_migration() {
    let mut db = seeded_database();
    let legacy = db.list_legacy_logs().unwrap();

    let report = run(&mut db, false, false).unwrap();

    assert_eq!(report.outcome, MigrationOutcome::Completed);
    assert!(report.mutated());
    assert_eq!(report.backed_up, 3);
    assert_eq!(report.incidents_created, 2);
    assert_eq!(report.logs_deleted, 3);
    assert_eq!(report.logs_created, 3);
    assert_eq!(report.steps.last(), Some(&MigrationStep::Done));

    assert!(db.list_legacy_logs().unwrap().is_empty());
    assert_eq!(db.list_backup_logs().unwrap(), legacy);

    let incidents = db.list_incidents().unwrap();
    assert_eq!(incidents.len(), 2);
    let back = incidents
        .iter()
        .find(|i| i.date_started == base())
        .unwrap();
    assert_eq!(back.pain_intensity, 3);
    assert!(back.status.resolved);

    let back_logs = db.list_incident_logs(Some(&back.id)).unwrap();
    assert_eq!(back_logs.len(), 2);
    assert!(back_logs
        .iter()
        .all(|l| l.issue_type == NormalizedIssueType::Update));
    // Newest first
    assert_eq!(back_logs[0].description, "back +6h");

    for original in &legacy {
        assert!(db.get_health_log(&original.id).unwrap().is_none());
    }
}

#[test]
fn test_dry_run_writes_nothing() {
    let mut db = seeded_database();

    let report = run(&mut db, true, false).unwrap();

    assert_eq!(report.outcome, MigrationOutcome::DryRun);
    assert!(!report.mutated());
    assert_eq!(report.incidents_created, 2);
    assert_eq!(report.logs_created, 3);
    assert!(!report.steps.contains(&MigrationStep::Backup));

    assert_eq!(db.list_legacy_logs().unwrap().len(), 3);
    assert!(db.list_backup_logs().unwrap().is_empty());
    assert!(db.list_incidents().unwrap().is_empty());
}

#[test]
fn test_check_only_wins_over_dry_run() {
    let mut db = seeded_database();

    let report = run(&mut db, true, true).unwrap();

    assert_eq!(report.outcome, MigrationOutcome::Checked);
    assert!(report.check.passed());
    assert_eq!(report.check.incident_count(), 2);
    assert_eq!(report.steps, vec![MigrationStep::Check]);
    assert_eq!(db.list_legacy_logs().unwrap().len(), 3);
}

#[test]
fn test_missing_key_aborts_before_any_write() {
    let mut db = seeded_database();
    let mut orphan = log("", 30, 4, LogStatus::Active);
    orphan.incident_key = None;
    db.insert_health_log(&orphan).unwrap();

    let err = run(&mut db, false, false).unwrap_err();

    match err {
        MigrationError::Validation(check) => {
            assert_eq!(check.missing_incident_key, vec![orphan.id]);
            assert_eq!(check.total_records, 4);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(db.list_legacy_logs().unwrap().len(), 4);
    assert!(db.list_backup_logs().unwrap().is_empty());
    assert!(db.list_incidents().unwrap().is_empty());
}

#[test]
fn test_check_only_reports_failure_without_error() {
    let mut db = seeded_database();
    let mut undated = log("back", 40, 2, LogStatus::Improving);
    undated.timestamp = None;
    db.insert_health_log(&undated).unwrap();

    let report = run(&mut db, false, true).unwrap();

    assert_eq!(report.outcome, MigrationOutcome::Checked);
    assert!(!report.check.passed());
    assert_eq!(report.check.missing_timestamp, vec![undated.id]);
}

#[test]
fn test_empty_database_has_nothing_to_migrate() {
    let mut db = Database::open_in_memory().unwrap();

    let report = run(&mut db, false, false).unwrap();

    assert_eq!(report.outcome, MigrationOutcome::NothingToMigrate);
    assert!(!report.mutated());
}

#[test]
fn test_second_run_finds_nothing_and_reports_existing_output() {
    let mut db = seeded_database();
    run(&mut db, false, false).unwrap();

    let report = run(&mut db, false, false).unwrap();

    assert_eq!(report.outcome, MigrationOutcome::NothingToMigrate);
    assert_eq!(report.check.existing_output.incidents, 2);
    assert_eq!(report.check.existing_output.backup, 3);
    assert_eq!(db.list_incidents().unwrap().len(), 2);
}

#[test]
fn test_migration_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("health.db");
    {
        let mut db = Database::open(&path).unwrap();
        db.insert_health_log(&log("back", 0, 3, LogStatus::Active)).unwrap();
        run(&mut db, false, false).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.list_incidents().unwrap().len(), 1);
    assert_eq!(db.list_incident_logs(None).unwrap().len(), 1);
    assert_eq!(db.list_backup_logs().unwrap().len(), 1);
}
