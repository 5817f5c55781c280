//! Database schema definitions.

/// SQL schema for creating all version 1 tables.
pub const SCHEMA: &str = r#"
-- Health logs table
-- Legacy entries carry incident_key and the pain/status/tag columns.
-- Migrated entries carry incident_id instead.
CREATE TABLE IF NOT EXISTS health_logs (
    id TEXT PRIMARY KEY,
    timestamp TEXT,
    incident_key TEXT,
    incident_id TEXT,
    issue_type TEXT NOT NULL,
    pain_level INTEGER,
    body_area TEXT,
    description TEXT NOT NULL,
    status TEXT,
    activities_json TEXT,
    triggers_json TEXT,
    symptoms_json TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_health_logs_timestamp ON health_logs(timestamp);
CREATE INDEX IF NOT EXISTS idx_health_logs_incident_key ON health_logs(incident_key);

-- Lab results table
CREATE TABLE IF NOT EXISTS lab_results (
    id TEXT PRIMARY KEY,
    test_date TEXT NOT NULL,
    test_type TEXT NOT NULL,
    ordered_by TEXT NOT NULL,
    lab_name TEXT,
    total_cholesterol_json TEXT,
    ldl_cholesterol_json TEXT,
    hdl_cholesterol_json TEXT,
    triglycerides_json TEXT,
    custom_results_json TEXT NOT NULL DEFAULT '[]',
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_lab_results_type_date ON lab_results(test_type, test_date);

-- Workouts table (synced activities)
CREATE TABLE IF NOT EXISTS workouts (
    id TEXT PRIMARY KEY,
    strava_id INTEGER NOT NULL UNIQUE,
    athlete_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    sport_type TEXT NOT NULL,
    start_date TEXT NOT NULL,
    start_date_local TEXT NOT NULL,
    distance REAL NOT NULL,
    moving_time INTEGER NOT NULL,
    elapsed_time INTEGER NOT NULL,
    total_elevation_gain REAL NOT NULL,
    average_speed REAL,
    max_speed REAL,
    average_heartrate REAL,
    max_heartrate REAL,
    calories REAL,
    device_name TEXT,
    description TEXT,
    trainer INTEGER NOT NULL DEFAULT 0,
    commute INTEGER NOT NULL DEFAULT 0,
    sync_date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workouts_start_date ON workouts(start_date);

-- Fitness goals table
CREATE TABLE IF NOT EXISTS fitness_goals (
    id TEXT PRIMARY KEY,
    goal_type TEXT NOT NULL,
    activity_type TEXT,
    sport_type TEXT,
    target_value REAL NOT NULL,
    current_value REAL NOT NULL DEFAULT 0,
    unit TEXT NOT NULL,
    time_period TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_fitness_goals_status ON fitness_goals(status);

-- Strava credentials, one row per athlete
CREATE TABLE IF NOT EXISTS strava_credentials (
    athlete_id INTEGER PRIMARY KEY,
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 3;

/// SQL for migration from v1 to v2 (normalized incidents and log backup)
pub const MIGRATION_V1_TO_V2: &str = r#"
-- Incidents table
CREATE TABLE IF NOT EXISTS health_incidents (
    id TEXT PRIMARY KEY,
    pain_locations_json TEXT NOT NULL,
    pain_intensity INTEGER NOT NULL,
    date_started TEXT NOT NULL,
    injury_source TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL,
    symptoms_json TEXT NOT NULL,
    treatments_json TEXT NOT NULL,
    status_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_health_incidents_date_started ON health_incidents(date_started);
CREATE INDEX IF NOT EXISTS idx_health_logs_incident_id ON health_logs(incident_id);

-- Untouched copy of legacy health logs taken before migrating
CREATE TABLE IF NOT EXISTS health_logs_backup (
    id TEXT PRIMARY KEY,
    timestamp TEXT,
    incident_key TEXT,
    issue_type TEXT NOT NULL,
    pain_level INTEGER,
    body_area TEXT,
    description TEXT NOT NULL,
    status TEXT,
    activities_json TEXT,
    triggers_json TEXT,
    symptoms_json TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    backed_up_at TEXT NOT NULL
);
"#;

/// SQL for migration from v2 to v3. Rebuilds health_logs so incident_id
/// references health_incidents; SQLite cannot add the constraint in place.
pub const MIGRATION_V2_TO_V3: &str = r#"
BEGIN;

CREATE TABLE health_logs_v3 (
    id TEXT PRIMARY KEY,
    timestamp TEXT,
    incident_key TEXT,
    incident_id TEXT REFERENCES health_incidents(id),
    issue_type TEXT NOT NULL,
    pain_level INTEGER,
    body_area TEXT,
    description TEXT NOT NULL,
    status TEXT,
    activities_json TEXT,
    triggers_json TEXT,
    symptoms_json TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

INSERT INTO health_logs_v3
    (id, timestamp, incident_key, incident_id, issue_type, pain_level, body_area,
     description, status, activities_json, triggers_json, symptoms_json, created_at, updated_at)
SELECT id, timestamp, incident_key, incident_id, issue_type, pain_level, body_area,
       description, status, activities_json, triggers_json, symptoms_json, created_at, updated_at
FROM health_logs;

DROP TABLE health_logs;
ALTER TABLE health_logs_v3 RENAME TO health_logs;

CREATE INDEX IF NOT EXISTS idx_health_logs_timestamp ON health_logs(timestamp);
CREATE INDEX IF NOT EXISTS idx_health_logs_incident_key ON health_logs(incident_key);
CREATE INDEX IF NOT EXISTS idx_health_logs_incident_id ON health_logs(incident_id);

COMMIT;
"#;
