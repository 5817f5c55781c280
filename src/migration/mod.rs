//! One-shot migration from flat health logs to incidents with linked logs.
//!
//! The engine runs against any [`MigrationStore`]; the SQLite implementation
//! lives in `storage::database`.

pub mod check;
pub mod engine;
pub mod store;
pub mod transform;

pub use check::{CheckReport, IncidentBreakdown};
pub use engine::{
    MigrationEngine, MigrationError, MigrationOptions, MigrationOutcome, MigrationReport,
    MigrationStep,
};
pub use store::{ExistingOutput, MigrationStore, StoreError};
pub use transform::{transform, Transformed};
