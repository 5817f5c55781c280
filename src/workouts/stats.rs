//! Summary statistics over synced workouts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::Workout;

/// Totals for one activity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub count: usize,
    pub total_distance: f64,
    pub total_moving_time: u64,
    pub total_elevation_gain: f64,
}

/// Dashboard statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStats {
    pub total_activities: usize,
    /// meters
    pub total_distance: f64,
    /// seconds
    pub total_moving_time: u64,
    /// meters
    pub total_elevation_gain: f64,
    /// meters, 0 when there are no activities
    pub average_distance: f64,
    /// seconds, 0 when there are no activities
    pub average_moving_time: f64,
    pub by_type: BTreeMap<String, TypeTotals>,
}

impl WorkoutStats {
    /// Aggregate a set of workouts.
    pub fn from_workouts<'a>(workouts: impl IntoIterator<Item = &'a Workout>) -> Self {
        let mut stats = WorkoutStats::default();

        for w in workouts {
            stats.total_activities += 1;
            stats.total_distance += w.distance;
            stats.total_moving_time += u64::from(w.moving_time);
            stats.total_elevation_gain += w.total_elevation_gain;

            let entry = stats.by_type.entry(w.activity_type.clone()).or_default();
            entry.count += 1;
            entry.total_distance += w.distance;
            entry.total_moving_time += u64::from(w.moving_time);
            entry.total_elevation_gain += w.total_elevation_gain;
        }

        if stats.total_activities > 0 {
            let n = stats.total_activities as f64;
            stats.average_distance = stats.total_distance / n;
            stats.average_moving_time = stats.total_moving_time as f64 / n;
        }

        stats
    }
}
