//! Database operations using rusqlite.
//!
//! One SQLite file holds health logs, incidents, lab results, cached
//! workouts, fitness goals and Strava credentials.

use crate::health::{
    HealthLogRecord, IncidentStatusFlags, LogStatus, NormalizedIncident, NormalizedIssueType,
    NormalizedLog, SymptomQuestionnaire, TreatmentHistory,
};
use crate::integrations::sync::StravaCredentials;
use crate::labs::{CustomLabResult, LabMeasurement, LabResult};
use crate::migration::{ExistingOutput, MigrationStore, StoreError};
use crate::storage::schema::{
    CURRENT_VERSION, MIGRATION_V1_TO_V2, MIGRATION_V2_TO_V3, SCHEMA, SCHEMA_VERSION_TABLE,
};
use crate::workouts::Workout;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

const LOG_COLUMNS: &str = "id, timestamp, incident_key, issue_type, pain_level, body_area,
     description, status, activities_json, triggers_json, symptoms_json, created_at, updated_at";

const INCIDENT_COLUMNS: &str = "id, pain_locations_json, pain_intensity, date_started,
     injury_source, description, symptoms_json, treatments_json, status_json, created_at, updated_at";

const WORKOUT_COLUMNS: &str = "id, strava_id, athlete_id, name, activity_type, sport_type,
     start_date, start_date_local, distance, moving_time, elapsed_time, total_elevation_gain,
     average_speed, max_speed, average_heartrate, max_heartrate, calories, device_name,
     description, trainer, commute, sync_date, created_at, updated_at";

const LAB_COLUMNS: &str = "id, test_date, test_type, ordered_by, lab_name, total_cholesterol_json,
     ldl_cholesterol_json, hdl_cholesterol_json, triglycerides_json, custom_results_json, notes,
     created_at, updated_at";

/// Whether an upsert created or replaced a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        enable_foreign_keys(&conn)?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        enable_foreign_keys(&conn)?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run schema migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.record_version(1)?;
        }

        if from_version < 2 {
            self.conn
                .execute_batch(MIGRATION_V1_TO_V2)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.record_version(2)?;
        }

        if from_version < 3 {
            self.conn
                .execute_batch(MIGRATION_V2_TO_V3)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.record_version(3)?;
        }

        tracing::info!("Database migrated to version {}", CURRENT_VERSION);

        Ok(())
    }

    fn record_version(&self, version: i32) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [version],
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn count_rows(&self, sql: &str) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(count as usize)
    }

    // ========== Health Logs ==========

    /// Insert a legacy-shaped health log.
    pub fn insert_health_log(&self, record: &HealthLogRecord) -> Result<(), DatabaseError> {
        insert_legacy_row(&self.conn, "health_logs", record, None)
    }

    /// Get a legacy-shaped health log by ID.
    pub fn get_health_log(&self, id: &Uuid) -> Result<Option<HealthLogRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM health_logs WHERE id = ?1 AND incident_id IS NULL",
            LOG_COLUMNS
        );
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], HealthLogRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(HealthLogRow::into_record).transpose()
    }

    /// All legacy-shaped health logs, oldest first.
    pub fn list_legacy_logs(&self) -> Result<Vec<HealthLogRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM health_logs WHERE incident_id IS NULL ORDER BY timestamp ASC",
            LOG_COLUMNS
        );
        self.query_logs(&sql, "health_logs")
    }

    /// All rows of the backup table.
    pub fn list_backup_logs(&self) -> Result<Vec<HealthLogRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM health_logs_backup ORDER BY timestamp ASC",
            LOG_COLUMNS
        );
        self.query_logs(&sql, "health_logs_backup")
    }

    fn query_logs(&self, sql: &str, table: &str) -> Result<Vec<HealthLogRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DatabaseError::QueryFailed(format!("{}: {}", table, e)))?;

        let rows = stmt
            .query_map([], HealthLogRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(HealthLogRow::into_record).collect()
    }

    /// Update a legacy-shaped health log.
    pub fn update_health_log(&self, record: &HealthLogRecord) -> Result<(), DatabaseError> {
        let updated = self
            .conn
            .execute(
                "UPDATE health_logs SET timestamp = ?1, incident_key = ?2, issue_type = ?3,
                 pain_level = ?4, body_area = ?5, description = ?6, status = ?7,
                 activities_json = ?8, triggers_json = ?9, symptoms_json = ?10, updated_at = ?11
                 WHERE id = ?12 AND incident_id IS NULL",
                params![
                    record.timestamp.map(ts),
                    record.incident_key,
                    record.issue_type,
                    record.pain_level,
                    record.body_area,
                    record.description,
                    record.status.as_str(),
                    to_json(&record.activities)?,
                    to_json(&record.triggers)?,
                    to_json(&record.symptoms)?,
                    ts(Utc::now()),
                    record.id.to_string(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if updated == 0 {
            return Err(DatabaseError::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    /// Delete a health log of either shape.
    pub fn delete_health_log(&self, id: &Uuid) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM health_logs WHERE id = ?1", params![id.to_string()])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(deleted > 0)
    }

    /// Logs attached to incidents, newest first, optionally for one incident.
    pub fn list_incident_logs(
        &self,
        incident_id: Option<&Uuid>,
    ) -> Result<Vec<NormalizedLog>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, incident_id, issue_type, description, created_at, updated_at
                 FROM health_logs
                 WHERE incident_id IS NOT NULL AND (?1 IS NULL OR incident_id = ?1)
                 ORDER BY timestamp DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![incident_id.map(|id| id.to_string())], |row| {
                Ok(NormalizedLogRow {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    incident_id: row.get(2)?,
                    issue_type: row.get(3)?,
                    description: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(NormalizedLogRow::into_log).collect()
    }

    // ========== Incidents ==========

    /// Get an incident by ID.
    pub fn get_incident(&self, id: &Uuid) -> Result<Option<NormalizedIncident>, DatabaseError> {
        let sql = format!("SELECT {} FROM health_incidents WHERE id = ?1", INCIDENT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], IncidentRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(IncidentRow::into_incident).transpose()
    }

    /// All incidents, most recently started first.
    pub fn list_incidents(&self) -> Result<Vec<NormalizedIncident>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM health_incidents ORDER BY date_started DESC",
            INCIDENT_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], IncidentRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(IncidentRow::into_incident).collect()
    }

    // ========== Lab Results ==========

    /// Insert a lab result.
    pub fn insert_lab_result(&self, result: &LabResult) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO lab_results (id, test_date, test_type, ordered_by, lab_name,
                 total_cholesterol_json, ldl_cholesterol_json, hdl_cholesterol_json,
                 triglycerides_json, custom_results_json, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    result.id.to_string(),
                    result.test_date.to_string(),
                    result.test_type,
                    result.ordered_by,
                    result.lab_name,
                    result.total_cholesterol.as_ref().map(to_json).transpose()?,
                    result.ldl_cholesterol.as_ref().map(to_json).transpose()?,
                    result.hdl_cholesterol.as_ref().map(to_json).transpose()?,
                    result.triglycerides.as_ref().map(to_json).transpose()?,
                    to_json(&result.custom_results)?,
                    result.notes,
                    ts(result.created_at),
                    ts(result.updated_at),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Lab results, newest test first, optionally of one type.
    pub fn list_lab_results(&self, test_type: Option<&str>) -> Result<Vec<LabResult>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM lab_results WHERE (?1 IS NULL OR test_type = ?1)
             ORDER BY test_date DESC",
            LAB_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![test_type], LabResultRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(LabResultRow::into_lab_result).collect()
    }

    // ========== Workouts ==========

    /// Insert a workout, or replace the cached copy with the same Strava ID.
    pub fn upsert_workout(&self, workout: &Workout) -> Result<UpsertOutcome, DatabaseError> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM workouts WHERE strava_id = ?1",
                params![workout.strava_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match existing {
            Some(_) => {
                self.conn
                    .execute(
                        "UPDATE workouts SET athlete_id = ?1, name = ?2, activity_type = ?3,
                         sport_type = ?4, start_date = ?5, start_date_local = ?6, distance = ?7,
                         moving_time = ?8, elapsed_time = ?9, total_elevation_gain = ?10,
                         average_speed = ?11, max_speed = ?12, average_heartrate = ?13,
                         max_heartrate = ?14, calories = ?15, device_name = ?16, description = ?17,
                         trainer = ?18, commute = ?19, sync_date = ?20, updated_at = ?21
                         WHERE strava_id = ?22",
                        params![
                            workout.athlete_id,
                            workout.name,
                            workout.activity_type,
                            workout.sport_type,
                            ts(workout.start_date),
                            ts(workout.start_date_local),
                            workout.distance,
                            workout.moving_time,
                            workout.elapsed_time,
                            workout.total_elevation_gain,
                            workout.average_speed,
                            workout.max_speed,
                            workout.average_heartrate,
                            workout.max_heartrate,
                            workout.calories,
                            workout.device_name,
                            workout.description,
                            workout.trainer,
                            workout.commute,
                            ts(workout.sync_date),
                            ts(workout.updated_at),
                            workout.strava_id,
                        ],
                    )
                    .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.conn
                    .execute(
                        &format!(
                            "INSERT INTO workouts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                             ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22,
                             ?23, ?24)",
                            WORKOUT_COLUMNS
                        ),
                        params![
                            workout.id.to_string(),
                            workout.strava_id,
                            workout.athlete_id,
                            workout.name,
                            workout.activity_type,
                            workout.sport_type,
                            ts(workout.start_date),
                            ts(workout.start_date_local),
                            workout.distance,
                            workout.moving_time,
                            workout.elapsed_time,
                            workout.total_elevation_gain,
                            workout.average_speed,
                            workout.max_speed,
                            workout.average_heartrate,
                            workout.max_heartrate,
                            workout.calories,
                            workout.device_name,
                            workout.description,
                            workout.trainer,
                            workout.commute,
                            ts(workout.sync_date),
                            ts(workout.created_at),
                            ts(workout.updated_at),
                        ],
                    )
                    .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Cached workouts, newest first, optionally since a date and of one type.
    pub fn list_workouts(
        &self,
        since: Option<DateTime<Utc>>,
        activity_type: Option<&str>,
    ) -> Result<Vec<Workout>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM workouts
             WHERE (?1 IS NULL OR start_date >= ?1) AND (?2 IS NULL OR activity_type = ?2)
             ORDER BY start_date DESC",
            WORKOUT_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![since.map(ts), activity_type], WorkoutRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(WorkoutRow::into_workout).collect()
    }

    // ========== Strava Credentials ==========

    /// Store credentials, replacing any for the same athlete.
    pub fn save_strava_credentials(&self, creds: &StravaCredentials) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO strava_credentials (athlete_id, access_token, refresh_token, expires_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(athlete_id) DO UPDATE SET
                 access_token = excluded.access_token,
                 refresh_token = excluded.refresh_token,
                 expires_at = excluded.expires_at,
                 updated_at = excluded.updated_at",
                params![
                    creds.athlete_id,
                    creds.access_token,
                    creds.refresh_token,
                    ts(creds.expires_at),
                    ts(Utc::now()),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tracing::debug!("Saved Strava credentials for athlete {}", creds.athlete_id);
        Ok(())
    }

    /// Credentials for one athlete.
    pub fn get_strava_credentials(
        &self,
        athlete_id: i64,
    ) -> Result<Option<StravaCredentials>, DatabaseError> {
        self.query_credentials(
            "SELECT athlete_id, access_token, refresh_token, expires_at
             FROM strava_credentials WHERE athlete_id = ?1",
            params![athlete_id],
        )
    }

    /// Most recently updated credentials, if any athlete has connected.
    pub fn latest_strava_credentials(&self) -> Result<Option<StravaCredentials>, DatabaseError> {
        self.query_credentials(
            "SELECT athlete_id, access_token, refresh_token, expires_at
             FROM strava_credentials ORDER BY updated_at DESC LIMIT 1",
            [],
        )
    }

    fn query_credentials<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Option<StravaCredentials>, DatabaseError> {
        let row = self
            .conn
            .query_row(sql, params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match row {
            Some((athlete_id, access_token, refresh_token, expires_at)) => {
                Ok(Some(StravaCredentials {
                    athlete_id,
                    access_token,
                    refresh_token,
                    expires_at: parse_ts(&expires_at)?,
                }))
            }
            None => Ok(None),
        }
    }
}

impl MigrationStore for Database {
    fn load_legacy_logs(&self) -> Result<Vec<HealthLogRecord>, StoreError> {
        Ok(self.list_legacy_logs()?)
    }

    fn existing_output_counts(&self) -> Result<ExistingOutput, StoreError> {
        Ok(ExistingOutput {
            incidents: self.count_rows("SELECT COUNT(*) FROM health_incidents")?,
            backup: self.count_rows("SELECT COUNT(*) FROM health_logs_backup")?,
        })
    }

    fn backup_logs(&mut self, logs: &[HealthLogRecord]) -> Result<usize, StoreError> {
        let backed_up_at = ts(Utc::now());
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        for record in logs {
            insert_legacy_row(&tx, "health_logs_backup", record, Some(&backed_up_at))?;
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(logs.len())
    }

    fn insert_incidents(&mut self, incidents: &[NormalizedIncident]) -> Result<usize, StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        for incident in incidents {
            tx.execute(
                &format!(
                    "INSERT INTO health_incidents ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    INCIDENT_COLUMNS
                ),
                params![
                    incident.id.to_string(),
                    to_json(&incident.pain_locations)?,
                    incident.pain_intensity,
                    ts(incident.date_started),
                    incident.injury_source,
                    incident.description,
                    to_json(&incident.symptoms)?,
                    to_json(&incident.treatments)?,
                    to_json(&incident.status)?,
                    ts(incident.created_at),
                    ts(incident.updated_at),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(incidents.len())
    }

    fn delete_legacy_logs(&mut self) -> Result<usize, StoreError> {
        Ok(delete_legacy_rows(&self.conn)?)
    }

    fn insert_logs(&mut self, logs: &[NormalizedLog]) -> Result<usize, StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        insert_normalized_rows(&tx, logs)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(logs.len())
    }

    fn replace_legacy_logs(
        &mut self,
        logs: &[NormalizedLog],
    ) -> Result<(usize, usize), StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        // Dropping the transaction on error rolls the delete back.
        let deleted = delete_legacy_rows(&tx)?;
        insert_normalized_rows(&tx, logs)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok((deleted, logs.len()))
    }
}

fn delete_legacy_rows(conn: &Connection) -> Result<usize, DatabaseError> {
    conn.execute("DELETE FROM health_logs WHERE incident_id IS NULL", [])
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

fn insert_normalized_rows(conn: &Connection, logs: &[NormalizedLog]) -> Result<(), DatabaseError> {
    for log in logs {
        conn.execute(
            "INSERT INTO health_logs (id, timestamp, incident_id, issue_type, description,
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                log.id.to_string(),
                ts(log.timestamp),
                log.incident_id.to_string(),
                log.issue_type.as_str(),
                log.description,
                ts(log.created_at),
                ts(log.updated_at),
            ],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
    }
    Ok(())
}

/// Insert a legacy-shaped row into `health_logs` or its backup table.
fn insert_legacy_row(
    conn: &Connection,
    table: &str,
    record: &HealthLogRecord,
    backed_up_at: Option<&str>,
) -> Result<(), DatabaseError> {
    let (extra_column, extra_value) = match backed_up_at {
        Some(_) => (", backed_up_at", ", ?14"),
        None => ("", ""),
    };
    let sql = format!(
        "INSERT INTO {} ({}{}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13{})",
        table, LOG_COLUMNS, extra_column, extra_value
    );

    let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![
        Box::new(record.id.to_string()),
        Box::new(record.timestamp.map(ts)),
        Box::new(record.incident_key.clone()),
        Box::new(record.issue_type.clone()),
        Box::new(record.pain_level),
        Box::new(record.body_area.clone()),
        Box::new(record.description.clone()),
        Box::new(record.status.as_str()),
        Box::new(to_json(&record.activities)?),
        Box::new(to_json(&record.triggers)?),
        Box::new(to_json(&record.symptoms)?),
        Box::new(ts(record.created_at)),
        Box::new(ts(record.updated_at)),
    ];
    if let Some(at) = backed_up_at {
        values.push(Box::new(at.to_string()));
    }

    conn.execute(&sql, rusqlite::params_from_iter(values.iter()))
        .map_err(|e| DatabaseError::QueryFailed(format!("{}: {}", table, e)))?;

    Ok(())
}

/// SQLite leaves foreign key enforcement off per connection.
fn enable_foreign_keys(conn: &Connection) -> Result<(), DatabaseError> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Sortable UTC timestamp text, fixed width so columns order lexically.
pub(crate) fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date {:?}: {}", s, e)))
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s)
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(json)
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid {} JSON: {}", what, e)))
}

/// Intermediate struct for legacy health log rows.
struct HealthLogRow {
    id: String,
    timestamp: Option<String>,
    incident_key: Option<String>,
    issue_type: String,
    pain_level: Option<u8>,
    body_area: Option<String>,
    description: String,
    status: Option<String>,
    activities_json: Option<String>,
    triggers_json: Option<String>,
    symptoms_json: Option<String>,
    created_at: String,
    updated_at: String,
}

impl HealthLogRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            incident_key: row.get(2)?,
            issue_type: row.get(3)?,
            pain_level: row.get(4)?,
            body_area: row.get(5)?,
            description: row.get(6)?,
            status: row.get(7)?,
            activities_json: row.get(8)?,
            triggers_json: row.get(9)?,
            symptoms_json: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_record(self) -> Result<HealthLogRecord, DatabaseError> {
        let tags = |json: Option<String>, what: &str| -> Result<Vec<String>, DatabaseError> {
            match json {
                Some(json) => from_json(&json, what),
                None => Ok(Vec::new()),
            }
        };

        let status = match self.status {
            Some(s) => LogStatus::parse(&s).ok_or_else(|| {
                DatabaseError::DeserializationError(format!("Invalid log status: {}", s))
            })?,
            None => LogStatus::default(),
        };

        Ok(HealthLogRecord {
            id: parse_uuid(&self.id)?,
            timestamp: self.timestamp.as_deref().map(parse_ts).transpose()?,
            incident_key: self.incident_key,
            pain_level: self.pain_level.unwrap_or(0),
            body_area: self.body_area.unwrap_or_default(),
            issue_type: self.issue_type,
            description: self.description,
            status,
            activities: tags(self.activities_json, "activities")?,
            triggers: tags(self.triggers_json, "triggers")?,
            symptoms: tags(self.symptoms_json, "symptoms")?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

struct NormalizedLogRow {
    id: String,
    timestamp: Option<String>,
    incident_id: String,
    issue_type: String,
    description: String,
    created_at: String,
    updated_at: String,
}

impl NormalizedLogRow {
    fn into_log(self) -> Result<NormalizedLog, DatabaseError> {
        let timestamp = self.timestamp.ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Log {} has no timestamp", self.id))
        })?;

        Ok(NormalizedLog {
            id: parse_uuid(&self.id)?,
            timestamp: parse_ts(&timestamp)?,
            incident_id: parse_uuid(&self.incident_id)?,
            issue_type: NormalizedIssueType::parse(&self.issue_type).ok_or_else(|| {
                DatabaseError::DeserializationError(format!("Invalid issue type: {}", self.issue_type))
            })?,
            description: self.description,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

struct IncidentRow {
    id: String,
    pain_locations_json: String,
    pain_intensity: u8,
    date_started: String,
    injury_source: String,
    description: String,
    symptoms_json: String,
    treatments_json: String,
    status_json: String,
    created_at: String,
    updated_at: String,
}

impl IncidentRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pain_locations_json: row.get(1)?,
            pain_intensity: row.get(2)?,
            date_started: row.get(3)?,
            injury_source: row.get(4)?,
            description: row.get(5)?,
            symptoms_json: row.get(6)?,
            treatments_json: row.get(7)?,
            status_json: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_incident(self) -> Result<NormalizedIncident, DatabaseError> {
        let symptoms: SymptomQuestionnaire = from_json(&self.symptoms_json, "symptoms")?;
        let treatments: TreatmentHistory = from_json(&self.treatments_json, "treatments")?;
        let status: IncidentStatusFlags = from_json(&self.status_json, "status")?;

        Ok(NormalizedIncident {
            id: parse_uuid(&self.id)?,
            pain_locations: from_json(&self.pain_locations_json, "pain locations")?,
            pain_intensity: self.pain_intensity,
            date_started: parse_ts(&self.date_started)?,
            injury_source: self.injury_source,
            description: self.description,
            symptoms,
            treatments,
            status,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

struct LabResultRow {
    id: String,
    test_date: String,
    test_type: String,
    ordered_by: String,
    lab_name: Option<String>,
    total_cholesterol_json: Option<String>,
    ldl_cholesterol_json: Option<String>,
    hdl_cholesterol_json: Option<String>,
    triglycerides_json: Option<String>,
    custom_results_json: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl LabResultRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            test_date: row.get(1)?,
            test_type: row.get(2)?,
            ordered_by: row.get(3)?,
            lab_name: row.get(4)?,
            total_cholesterol_json: row.get(5)?,
            ldl_cholesterol_json: row.get(6)?,
            hdl_cholesterol_json: row.get(7)?,
            triglycerides_json: row.get(8)?,
            custom_results_json: row.get(9)?,
            notes: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_lab_result(self) -> Result<LabResult, DatabaseError> {
        let measurement = |json: Option<String>| -> Result<Option<LabMeasurement>, DatabaseError> {
            json.map(|j| from_json(&j, "measurement")).transpose()
        };

        let test_date = NaiveDate::parse_from_str(&self.test_date, "%Y-%m-%d").map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid test date: {}", e))
        })?;
        let custom_results: Vec<CustomLabResult> =
            from_json(&self.custom_results_json, "custom results")?;

        Ok(LabResult {
            id: parse_uuid(&self.id)?,
            test_date,
            test_type: self.test_type,
            ordered_by: self.ordered_by,
            lab_name: self.lab_name,
            total_cholesterol: measurement(self.total_cholesterol_json)?,
            ldl_cholesterol: measurement(self.ldl_cholesterol_json)?,
            hdl_cholesterol: measurement(self.hdl_cholesterol_json)?,
            triglycerides: measurement(self.triglycerides_json)?,
            custom_results,
            notes: self.notes,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

struct WorkoutRow {
    id: String,
    strava_id: i64,
    athlete_id: i64,
    name: String,
    activity_type: String,
    sport_type: String,
    start_date: String,
    start_date_local: String,
    distance: f64,
    moving_time: u32,
    elapsed_time: u32,
    total_elevation_gain: f64,
    average_speed: Option<f64>,
    max_speed: Option<f64>,
    average_heartrate: Option<f64>,
    max_heartrate: Option<f64>,
    calories: Option<f64>,
    device_name: Option<String>,
    description: Option<String>,
    trainer: bool,
    commute: bool,
    sync_date: String,
    created_at: String,
    updated_at: String,
}

impl WorkoutRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            strava_id: row.get(1)?,
            athlete_id: row.get(2)?,
            name: row.get(3)?,
            activity_type: row.get(4)?,
            sport_type: row.get(5)?,
            start_date: row.get(6)?,
            start_date_local: row.get(7)?,
            distance: row.get(8)?,
            moving_time: row.get(9)?,
            elapsed_time: row.get(10)?,
            total_elevation_gain: row.get(11)?,
            average_speed: row.get(12)?,
            max_speed: row.get(13)?,
            average_heartrate: row.get(14)?,
            max_heartrate: row.get(15)?,
            calories: row.get(16)?,
            device_name: row.get(17)?,
            description: row.get(18)?,
            trainer: row.get(19)?,
            commute: row.get(20)?,
            sync_date: row.get(21)?,
            created_at: row.get(22)?,
            updated_at: row.get(23)?,
        })
    }

    fn into_workout(self) -> Result<Workout, DatabaseError> {
        Ok(Workout {
            id: parse_uuid(&self.id)?,
            strava_id: self.strava_id,
            athlete_id: self.athlete_id,
            name: self.name,
            activity_type: self.activity_type,
            sport_type: self.sport_type,
            start_date: parse_ts(&self.start_date)?,
            start_date_local: parse_ts(&self.start_date_local)?,
            distance: self.distance,
            moving_time: self.moving_time,
            elapsed_time: self.elapsed_time,
            total_elevation_gain: self.total_elevation_gain,
            average_speed: self.average_speed,
            max_speed: self.max_speed,
            average_heartrate: self.average_heartrate,
            max_heartrate: self.max_heartrate,
            calories: self.calories,
            device_name: self.device_name,
            description: self.description,
            trainer: self.trainer,
            commute: self.commute,
            sync_date: parse_ts(&self.sync_date)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
