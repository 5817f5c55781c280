//! Fitness goals module.
//!
//! Goals accumulate distance, duration, elevation or activity counts from
//! synced workouts over a week, month, year or custom window.

pub mod manager;
pub mod progress;
pub mod types;

// Re-exports for convenience
pub use manager::{GoalError, GoalFilter, GoalManager};
pub use progress::compute_progress;
pub use types::{FitnessGoal, GoalProgress, GoalStatus, GoalType, GoalWithProgress, TimePeriod};
