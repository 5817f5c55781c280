//! Fitness goal management.
//!
//! CRUD over the `fitness_goals` table. Reads that return progress always
//! recompute it from the workout history and write the cached value back.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::progress::{compute_progress, validate_target};
use super::types::{FitnessGoal, GoalStatus, GoalType, GoalWithProgress, TimePeriod};
use crate::storage::database::ts;
use crate::workouts::Workout;

const GOAL_COLUMNS: &str = "id, goal_type, activity_type, sport_type, target_value, current_value,
     unit, time_period, start_date, end_date, status, description, created_at, updated_at";

/// Optional filters for listing goals.
#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    pub status: Option<GoalStatus>,
    pub goal_type: Option<GoalType>,
    pub activity_type: Option<String>,
}

/// Manager for fitness goals.
pub struct GoalManager<'a> {
    conn: &'a Connection,
}

impl<'a> GoalManager<'a> {
    /// Create a new goal manager with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new fitness goal.
    pub fn create(&self, goal: &FitnessGoal) -> Result<(), GoalError> {
        validate_target(goal.target_value)?;

        if goal.time_period.requires_end_date() && goal.end_date.is_none() {
            return Err(GoalError::ValidationError(
                "Custom time periods require an end date".to_string(),
            ));
        }

        if let Some(end) = goal.end_date {
            if end < goal.start_date {
                return Err(GoalError::ValidationError(
                    "End date must not be before start date".to_string(),
                ));
            }
        }

        self.conn.execute(
            "INSERT INTO fitness_goals
             (id, goal_type, activity_type, sport_type, target_value, current_value,
              unit, time_period, start_date, end_date, status, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                goal.id.to_string(),
                goal.goal_type.as_str(),
                goal.activity_type,
                goal.sport_type,
                goal.target_value,
                goal.current_value,
                goal.unit,
                goal.time_period.as_str(),
                ts(goal.start_date),
                goal.end_date.map(ts),
                goal.status.as_str(),
                goal.description,
                ts(goal.created_at),
                ts(goal.updated_at),
            ],
        )?;

        tracing::info!("Created {} goal {}", goal.goal_type, goal.id);

        Ok(())
    }

    /// Get a goal by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<FitnessGoal>, GoalError> {
        let sql = format!("SELECT {} FROM fitness_goals WHERE id = ?1", GOAL_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], GoalRow::from_row)
            .optional()?;

        row.map(GoalRow::into_goal).transpose()
    }

    /// List goals, most recently created first.
    pub fn list(&self, filter: &GoalFilter) -> Result<Vec<FitnessGoal>, GoalError> {
        let sql = format!(
            "SELECT {} FROM fitness_goals
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR goal_type = ?2)
               AND (?3 IS NULL OR activity_type = ?3)
             ORDER BY created_at DESC",
            GOAL_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                filter.status.map(|s| s.as_str()),
                filter.goal_type.map(|t| t.as_str()),
                filter.activity_type,
            ],
            GoalRow::from_row,
        )?;

        let rows = rows.collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(GoalRow::into_goal).collect()
    }

    /// Update a goal. The cached current value is not touched here.
    pub fn update(&self, goal: &FitnessGoal) -> Result<(), GoalError> {
        validate_target(goal.target_value)?;
        let now = Utc::now();

        let updated = self.conn.execute(
            "UPDATE fitness_goals SET
             goal_type = ?1, activity_type = ?2, sport_type = ?3, target_value = ?4,
             unit = ?5, time_period = ?6, start_date = ?7, end_date = ?8,
             status = ?9, description = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                goal.goal_type.as_str(),
                goal.activity_type,
                goal.sport_type,
                goal.target_value,
                goal.unit,
                goal.time_period.as_str(),
                ts(goal.start_date),
                goal.end_date.map(ts),
                goal.status.as_str(),
                goal.description,
                ts(now),
                goal.id.to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(GoalError::NotFound(goal.id));
        }
        Ok(())
    }

    /// Update goal status.
    pub fn update_status(&self, id: Uuid, status: GoalStatus) -> Result<(), GoalError> {
        let now = Utc::now();

        let updated = self.conn.execute(
            "UPDATE fitness_goals SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts(now), id.to_string()],
        )?;

        if updated == 0 {
            return Err(GoalError::NotFound(id));
        }
        Ok(())
    }

    /// Delete a goal.
    pub fn delete(&self, id: Uuid) -> Result<bool, GoalError> {
        let deleted = self.conn.execute(
            "DELETE FROM fitness_goals WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    /// List goals with progress recomputed from `workouts`.
    ///
    /// The stored `current_value` of each goal is refreshed as a side effect.
    pub fn list_with_progress(
        &self,
        filter: &GoalFilter,
        workouts: &[Workout],
        now: DateTime<Utc>,
    ) -> Result<Vec<GoalWithProgress>, GoalError> {
        let goals = self.list(filter)?;
        let mut result = Vec::with_capacity(goals.len());

        for mut goal in goals {
            let progress = compute_progress(&goal, workouts, now)?;
            if progress.current_value != goal.current_value {
                self.conn.execute(
                    "UPDATE fitness_goals SET current_value = ?1 WHERE id = ?2",
                    params![progress.current_value, goal.id.to_string()],
                )?;
                goal.current_value = progress.current_value;
            }
            result.push(GoalWithProgress { goal, progress });
        }

        Ok(result)
    }
}

/// Raw column values of a goal row.
struct GoalRow {
    id: String,
    goal_type: String,
    activity_type: Option<String>,
    sport_type: Option<String>,
    target_value: f64,
    current_value: f64,
    unit: String,
    time_period: String,
    start_date: String,
    end_date: Option<String>,
    status: String,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

impl GoalRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            goal_type: row.get(1)?,
            activity_type: row.get(2)?,
            sport_type: row.get(3)?,
            target_value: row.get(4)?,
            current_value: row.get(5)?,
            unit: row.get(6)?,
            time_period: row.get(7)?,
            start_date: row.get(8)?,
            end_date: row.get(9)?,
            status: row.get(10)?,
            description: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn into_goal(self) -> Result<FitnessGoal, GoalError> {
        let invalid = |field: &str, value: &str| {
            GoalError::InvalidRecord(format!("{} = {:?}", field, value))
        };

        Ok(FitnessGoal {
            id: Uuid::parse_str(&self.id).map_err(|_| invalid("id", &self.id))?,
            goal_type: GoalType::parse(&self.goal_type)
                .ok_or_else(|| invalid("goal_type", &self.goal_type))?,
            activity_type: self.activity_type,
            sport_type: self.sport_type,
            target_value: self.target_value,
            current_value: self.current_value,
            unit: self.unit,
            time_period: TimePeriod::parse(&self.time_period)
                .ok_or_else(|| invalid("time_period", &self.time_period))?,
            start_date: parse_timestamp(&self.start_date)
                .ok_or_else(|| invalid("start_date", &self.start_date))?,
            end_date: match self.end_date {
                Some(ref s) => Some(parse_timestamp(s).ok_or_else(|| invalid("end_date", s))?),
                None => None,
            },
            status: GoalStatus::parse(&self.status)
                .ok_or_else(|| invalid("status", &self.status))?,
            description: self.description,
            created_at: parse_timestamp(&self.created_at)
                .ok_or_else(|| invalid("created_at", &self.created_at))?,
            updated_at: parse_timestamp(&self.updated_at)
                .ok_or_else(|| invalid("updated_at", &self.updated_at))?,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Goal management errors.
#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid goal record: {0}")]
    InvalidRecord(String),

    #[error("Goal not found: {0}")]
    NotFound(Uuid),
}
