//! Workout module for activities synced from Strava.

pub mod stats;
pub mod types;
pub mod units;

pub use stats::{TypeTotals, WorkoutStats};
pub use types::Workout;
