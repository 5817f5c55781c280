//! Goal progress calculation.
//!
//! Progress is always derived from the workout history; the goal's stored
//! `current_value` is never used as an input.

use chrono::{DateTime, Utc};

use super::manager::GoalError;
use super::types::{FitnessGoal, GoalProgress, GoalType};
use crate::workouts::units::{FEET_PER_METER, MILES_PER_METER};
use crate::workouts::Workout;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Reject targets that would make the percentage undefined.
pub fn validate_target(target_value: f64) -> Result<(), GoalError> {
    if !target_value.is_finite() || target_value <= 0.0 {
        return Err(GoalError::ValidationError(format!(
            "Target value must be a positive number, got {}",
            target_value
        )));
    }
    Ok(())
}

/// Whether a workout counts toward the goal.
pub fn matches_goal(goal: &FitnessGoal, workout: &Workout, now: DateTime<Utc>) -> bool {
    if workout.start_date < goal.start_date || workout.start_date > goal.window_end(now) {
        return false;
    }
    if let Some(ref activity_type) = goal.activity_type {
        if &workout.activity_type != activity_type {
            return false;
        }
    }
    if let Some(ref sport_type) = goal.sport_type {
        if &workout.sport_type != sport_type {
            return false;
        }
    }
    true
}

/// Sum matching workouts in the goal's unit, before rounding.
fn accumulate(goal: &FitnessGoal, matching: &[&Workout]) -> f64 {
    match goal.goal_type {
        GoalType::Distance => {
            let meters: f64 = matching.iter().map(|w| w.distance).sum();
            match goal.unit.as_str() {
                "km" => meters / 1000.0,
                "mi" => meters * MILES_PER_METER,
                _ => meters,
            }
        }
        GoalType::Duration => {
            let seconds: f64 = matching.iter().map(|w| f64::from(w.moving_time)).sum();
            match goal.unit.as_str() {
                "hours" => seconds / 3600.0,
                "minutes" => seconds / 60.0,
                _ => seconds,
            }
        }
        GoalType::Elevation => {
            let meters: f64 = matching.iter().map(|w| w.total_elevation_gain).sum();
            match goal.unit.as_str() {
                "ft" => meters * FEET_PER_METER,
                _ => meters,
            }
        }
        GoalType::Frequency => matching.len() as f64,
        GoalType::Custom => 0.0,
    }
}

/// Compute progress for `goal` from the given workouts.
///
/// Workouts outside `[start_date, end_date or now]` or not matching the
/// activity/sport filters are ignored.
pub fn compute_progress(
    goal: &FitnessGoal,
    workouts: &[Workout],
    now: DateTime<Utc>,
) -> Result<GoalProgress, GoalError> {
    validate_target(goal.target_value)?;

    let matching: Vec<&Workout> = workouts
        .iter()
        .filter(|w| matches_goal(goal, w, now))
        .collect();

    let current_value = round_to(accumulate(goal, &matching), 2);
    let percentage = round_to(
        (current_value / goal.target_value * 100.0).min(100.0),
        1,
    );
    let remaining = (goal.target_value - current_value).max(0.0);

    tracing::debug!(
        "Goal {} ({}): {} matching workouts, current {} {}",
        goal.id,
        goal.goal_type,
        matching.len(),
        current_value,
        goal.unit
    );

    Ok(GoalProgress {
        current_value,
        percentage,
        remaining,
    })
}
