//! External integrations.
//!
//! Only Strava is supported; activities become cached workouts.

pub mod sync;

pub use sync::{StravaApi, StravaClient, StravaCredentials, SyncError, SyncSummary};
