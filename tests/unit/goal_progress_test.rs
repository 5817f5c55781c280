//! Unit tests for goal progress.

use chrono::{Duration, TimeZone, Utc};
use healthlog::goals::{compute_progress, FitnessGoal, GoalError, GoalType, TimePeriod};
use healthlog::workouts::Workout;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
}

fn month_start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_one_hundred_miles_caps_at_target() {
    let goal = FitnessGoal::new(GoalType::Distance, 100.0, "mi", TimePeriod::Month, month_start());
    let workouts = vec![
        Workout::new(1, "Ride", now() - Duration::days(5)).with_distance(80467.0),
        Workout::new(2, "Ride", now() - Duration::days(2)).with_distance(96560.0),
    ];

    let progress = compute_progress(&goal, &workouts, now()).unwrap();

    assert!(progress.current_value > 100.0);
    assert_eq!(progress.percentage, 100.0);
    assert_eq!(progress.remaining, 0.0);
}

#[test]
fn test_frequency_counts_matching_activity_type() {
    let goal = FitnessGoal::new(GoalType::Frequency, 12.0, "activities", TimePeriod::Month, month_start())
        .for_activity("Run");
    let workouts = vec![
        Workout::new(1, "Run", now() - Duration::days(10)),
        Workout::new(2, "Run", now() - Duration::days(8)),
        Workout::new(3, "Ride", now() - Duration::days(7)),
        Workout::new(4, "Run", now() - Duration::days(6)),
    ];

    let progress = compute_progress(&goal, &workouts, now()).unwrap();

    assert_eq!(progress.current_value, 3.0);
    assert_eq!(progress.percentage, 25.0);
    assert_eq!(progress.remaining, 9.0);
}

#[test]
fn test_duration_in_hours() {
    let goal = FitnessGoal::new(GoalType::Duration, 10.0, "hours", TimePeriod::Month, month_start());
    let workouts = vec![
        Workout::new(1, "Ride", now() - Duration::days(3)).with_moving_time(5400),
        Workout::new(2, "Run", now() - Duration::days(1)).with_moving_time(1800),
    ];

    let progress = compute_progress(&goal, &workouts, now()).unwrap();

    assert_eq!(progress.current_value, 2.0);
    assert_eq!(progress.percentage, 20.0);
}

#[test]
fn test_elevation_in_feet() {
    let goal = FitnessGoal::new(GoalType::Elevation, 10000.0, "ft", TimePeriod::Month, month_start());
    let workouts = vec![Workout::new(1, "Ride", now() - Duration::days(3)).with_elevation(1000.0)];

    let progress = compute_progress(&goal, &workouts, now()).unwrap();

    assert!((progress.current_value - 3280.84).abs() < 0.01);
    assert_eq!(progress.percentage, 32.8);
}

#[test]
fn test_workouts_outside_window_ignored() {
    let goal = FitnessGoal::new(GoalType::Frequency, 4.0, "activities", TimePeriod::Custom, month_start())
        .ending(Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
    let workouts = vec![
        Workout::new(1, "Run", month_start() - Duration::hours(1)),
        Workout::new(2, "Run", month_start()),
        Workout::new(3, "Run", Utc.with_ymd_and_hms(2025, 3, 9, 8, 0, 0).unwrap()),
        Workout::new(4, "Run", Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap()),
    ];

    let progress = compute_progress(&goal, &workouts, now()).unwrap();

    assert_eq!(progress.current_value, 2.0);
}

#[test]
fn test_no_workouts_is_zero() {
    let goal = FitnessGoal::new(GoalType::Distance, 50.0, "km", TimePeriod::Month, month_start());

    let progress = compute_progress(&goal, &[], now()).unwrap();

    assert_eq!(progress.current_value, 0.0);
    assert_eq!(progress.percentage, 0.0);
    assert_eq!(progress.remaining, 50.0);
    assert!(!progress.is_complete());
}

#[test]
fn test_zero_target_rejected() {
    let goal = FitnessGoal::new(GoalType::Distance, 0.0, "km", TimePeriod::Month, month_start());

    let result = compute_progress(&goal, &[], now());

    assert!(matches!(result, Err(GoalError::ValidationError(_))));
}
