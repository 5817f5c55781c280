//! HealthLog - Personal Health Tracking
//!
//! A self-hosted health tracker: pain logs grouped into incidents, lab
//! results flagged against reference ranges, and fitness goals measured
//! against workouts synced from Strava. Includes the one-shot migration from
//! flat health logs to normalized incidents.

pub mod goals;
pub mod health;
pub mod integrations;
pub mod labs;
pub mod migration;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use goals::{compute_progress, GoalManager};
pub use health::group_into_incidents;
pub use labs::flag;
pub use migration::{MigrationEngine, MigrationOptions};
pub use storage::{AppConfig, Database};
