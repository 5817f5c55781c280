//! Storage seam used by the migration engine.

use serde::{Deserialize, Serialize};

use crate::health::{HealthLogRecord, NormalizedIncident, NormalizedLog};

/// Error type returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Rows already present in the migration's output tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingOutput {
    pub incidents: usize,
    pub backup: usize,
}

impl ExistingOutput {
    pub fn is_empty(&self) -> bool {
        self.incidents == 0 && self.backup == 0
    }
}

/// Collections the migration reads from and writes to.
///
/// Write methods return the number of rows affected.
pub trait MigrationStore {
    /// All entries still in the legacy shape.
    fn load_legacy_logs(&self) -> Result<Vec<HealthLogRecord>, StoreError>;

    fn existing_output_counts(&self) -> Result<ExistingOutput, StoreError>;

    /// Copy entries unmodified into the backup collection.
    fn backup_logs(&mut self, logs: &[HealthLogRecord]) -> Result<usize, StoreError>;

    fn insert_incidents(&mut self, incidents: &[NormalizedIncident]) -> Result<usize, StoreError>;

    /// Remove every legacy-shaped entry from the live collection.
    fn delete_legacy_logs(&mut self) -> Result<usize, StoreError>;

    fn insert_logs(&mut self, logs: &[NormalizedLog]) -> Result<usize, StoreError>;

    /// Swap every legacy-shaped entry for `logs`, returning
    /// `(deleted, inserted)`. Stores with transactions should override this
    /// so a failed insert leaves the legacy entries in place.
    fn replace_legacy_logs(
        &mut self,
        logs: &[NormalizedLog],
    ) -> Result<(usize, usize), StoreError> {
        let deleted = self.delete_legacy_logs()?;
        let inserted = self.insert_logs(logs)?;
        Ok((deleted, inserted))
    }
}
