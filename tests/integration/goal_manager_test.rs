//! Integration tests for goal storage and progress over synced workouts.

use chrono::{Duration, Utc};
use healthlog::goals::{
    FitnessGoal, GoalError, GoalFilter, GoalManager, GoalStatus, GoalType, TimePeriod,
};
use healthlog::storage::{Database, UpsertOutcome};
use healthlog::workouts::Workout;

#[test]
fn test_goal_progress_from_cached_workouts() {
    let db = Database::open_in_memory().unwrap();
    let start = Utc::now() - Duration::days(14);
    for (id, kind, meters) in [(1, "Run", 5000.0), (2, "Run", 10000.0), (3, "Ride", 40000.0)] {
        let workout = Workout::new(id, kind, Utc::now() - Duration::days(id)).with_distance(meters);
        assert_eq!(db.upsert_workout(&workout).unwrap(), UpsertOutcome::Inserted);
    }

    let manager = GoalManager::new(db.connection());
    let running = FitnessGoal::new(GoalType::Distance, 30.0, "km", TimePeriod::Month, start)
        .for_activity("Run");
    let rides = FitnessGoal::new(GoalType::Frequency, 4.0, "activities", TimePeriod::Month, start)
        .for_activity("Ride");
    manager.create(&running).unwrap();
    manager.create(&rides).unwrap();

    let workouts = db.list_workouts(None, None).unwrap();
    let listed = manager
        .list_with_progress(&GoalFilter::default(), &workouts, Utc::now())
        .unwrap();
    assert_eq!(listed.len(), 2);

    let run_entry = listed.iter().find(|g| g.goal.id == running.id).unwrap();
    assert_eq!(run_entry.progress.current_value, 15.0);
    assert_eq!(run_entry.progress.percentage, 50.0);

    let ride_entry = listed.iter().find(|g| g.goal.id == rides.id).unwrap();
    assert_eq!(ride_entry.progress.current_value, 1.0);
    assert_eq!(ride_entry.progress.percentage, 25.0);

    // Cached value is written back
    let stored = manager.get(running.id).unwrap().unwrap();
    assert_eq!(stored.current_value, 15.0);
}

#[test]
fn test_goal_lifecycle() {
    let db = Database::open_in_memory().unwrap();
    let manager = GoalManager::new(db.connection());
    let goal = FitnessGoal::new(GoalType::Elevation, 5000.0, "m", TimePeriod::Year, Utc::now());
    manager.create(&goal).unwrap();

    manager.update_status(goal.id, GoalStatus::Completed).unwrap();
    let active = manager
        .list(&GoalFilter {
            status: Some(GoalStatus::Active),
            ..Default::default()
        })
        .unwrap();
    assert!(active.is_empty());

    assert!(manager.delete(goal.id).unwrap());
    assert!(manager.get(goal.id).unwrap().is_none());
    assert!(matches!(
        manager.update_status(goal.id, GoalStatus::Active),
        Err(GoalError::NotFound(_))
    ));
}

#[test]
fn test_invalid_goals_rejected() {
    let db = Database::open_in_memory().unwrap();
    let manager = GoalManager::new(db.connection());

    let zero = FitnessGoal::new(GoalType::Distance, 0.0, "km", TimePeriod::Week, Utc::now());
    assert!(matches!(manager.create(&zero), Err(GoalError::ValidationError(_))));

    let open_custom = FitnessGoal::new(GoalType::Distance, 10.0, "km", TimePeriod::Custom, Utc::now());
    assert!(matches!(manager.create(&open_custom), Err(GoalError::ValidationError(_))));

    assert!(manager.list(&GoalFilter::default()).unwrap().is_empty());
}
