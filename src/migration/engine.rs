//! Migration state machine.
//!
//! `Check -> Transform -> Backup -> InsertIncidents -> ReplaceLogs -> Done`,
//! or `Check -> Aborted` when any legacy record is invalid, or
//! `Backup -> Aborted` when the backup fails or comes up short. Nothing is
//! written before the backup has fully succeeded.

use serde::{Deserialize, Serialize};

use super::check::CheckReport;
use super::store::{MigrationStore, StoreError};
use super::transform::{transform, Transformed};

/// Steps of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStep {
    Check,
    Transform,
    Backup,
    InsertIncidents,
    ReplaceLogs,
    Done,
    Aborted,
}

impl MigrationStep {
    pub fn display_name(&self) -> &'static str {
        match self {
            MigrationStep::Check => "check",
            MigrationStep::Transform => "transform",
            MigrationStep::Backup => "backup",
            MigrationStep::InsertIncidents => "insert incidents",
            MigrationStep::ReplaceLogs => "replace logs",
            MigrationStep::Done => "done",
            MigrationStep::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Run mode flags. `check_only` wins over `dry_run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Check and transform, then report what would be written
    pub dry_run: bool,
    /// Check and report only
    pub check_only: bool,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationOutcome {
    /// Check-only run; see `check.passed()` for the verdict
    Checked,
    /// The legacy collection was empty
    NothingToMigrate,
    /// Dry run; counts are what a real run would write
    DryRun,
    Completed,
}

/// Summary of a migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub outcome: MigrationOutcome,
    pub check: CheckReport,
    /// Steps entered, in order
    pub steps: Vec<MigrationStep>,
    pub backed_up: usize,
    pub incidents_created: usize,
    pub logs_deleted: usize,
    pub logs_created: usize,
}

impl MigrationReport {
    fn new(outcome: MigrationOutcome, check: CheckReport, steps: Vec<MigrationStep>) -> Self {
        Self {
            outcome,
            check,
            steps,
            backed_up: 0,
            incidents_created: 0,
            logs_deleted: 0,
            logs_created: 0,
        }
    }

    /// Whether anything was written.
    pub fn mutated(&self) -> bool {
        self.outcome == MigrationOutcome::Completed
    }
}

/// Migration errors. Every variant means the run stopped at that point.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Pre-check failed: {0}")]
    Validation(CheckReport),

    #[error("Backup failed, no changes made: {0}")]
    BackupFailed(#[source] StoreError),

    #[error("Backup incomplete, no changes made: {written} of {expected} records written")]
    BackupIncomplete { written: usize, expected: usize },

    #[error("Storage error during {step}: {source}")]
    Store {
        step: MigrationStep,
        #[source]
        source: StoreError,
    },
}

/// Runs the one-shot migration against a store.
///
/// Assumes exclusive access to the store for the duration of [`run`](Self::run).
pub struct MigrationEngine<'a, S: MigrationStore> {
    store: &'a mut S,
    options: MigrationOptions,
    steps: Vec<MigrationStep>,
}

impl<'a, S: MigrationStore> MigrationEngine<'a, S> {
    pub fn new(store: &'a mut S, options: MigrationOptions) -> Self {
        Self {
            store,
            options,
            steps: Vec::new(),
        }
    }

    fn enter(&mut self, step: MigrationStep) {
        tracing::info!("Migration step: {}", step);
        self.steps.push(step);
    }

    fn store_err(step: MigrationStep) -> impl FnOnce(StoreError) -> MigrationError {
        move |source| MigrationError::Store { step, source }
    }

    /// Steps entered so far, including `Aborted` after a failed run.
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Run the migration to completion or until the first failure.
    pub fn run(&mut self) -> Result<MigrationReport, MigrationError> {
        if self.options.dry_run && !self.options.check_only {
            tracing::info!("Dry run: no changes will be made");
        }

        // Check
        self.enter(MigrationStep::Check);
        let legacy = self
            .store
            .load_legacy_logs()
            .map_err(Self::store_err(MigrationStep::Check))?;
        let existing = self
            .store
            .existing_output_counts()
            .map_err(Self::store_err(MigrationStep::Check))?;
        let check = CheckReport::build(&legacy, existing);
        check.log_summary();

        if self.options.check_only {
            return Ok(MigrationReport::new(
                MigrationOutcome::Checked,
                check,
                self.steps.clone(),
            ));
        }

        if !check.passed() {
            self.enter(MigrationStep::Aborted);
            return Err(MigrationError::Validation(check));
        }

        if legacy.is_empty() {
            tracing::info!("No health logs to migrate");
            return Ok(MigrationReport::new(
                MigrationOutcome::NothingToMigrate,
                check,
                self.steps.clone(),
            ));
        }

        // Transform
        self.enter(MigrationStep::Transform);
        let Transformed { incidents, logs } = transform(&legacy);
        tracing::info!(
            "Transformed {} legacy logs into {} incidents and {} logs",
            legacy.len(),
            incidents.len(),
            logs.len()
        );

        if self.options.dry_run {
            tracing::info!("Would back up {} records", legacy.len());
            tracing::info!("Would insert {} incidents", incidents.len());
            tracing::info!(
                "Would delete {} legacy logs and insert {} logs",
                legacy.len(),
                logs.len()
            );
            let mut report =
                MigrationReport::new(MigrationOutcome::DryRun, check, self.steps.clone());
            report.backed_up = legacy.len();
            report.incidents_created = incidents.len();
            report.logs_deleted = legacy.len();
            report.logs_created = logs.len();
            return Ok(report);
        }

        // Backup
        self.enter(MigrationStep::Backup);
        let backed_up = match self.store.backup_logs(&legacy) {
            Ok(n) => n,
            Err(e) => {
                self.enter(MigrationStep::Aborted);
                return Err(MigrationError::BackupFailed(e));
            }
        };
        if backed_up != legacy.len() {
            self.enter(MigrationStep::Aborted);
            return Err(MigrationError::BackupIncomplete {
                written: backed_up,
                expected: legacy.len(),
            });
        }
        tracing::info!("Backed up {} records", backed_up);

        // Insert incidents
        self.enter(MigrationStep::InsertIncidents);
        let incidents_created = self
            .store
            .insert_incidents(&incidents)
            .map_err(Self::store_err(MigrationStep::InsertIncidents))?;
        tracing::info!("Inserted {} incidents", incidents_created);

        // Replace logs
        self.enter(MigrationStep::ReplaceLogs);
        let (logs_deleted, logs_created) = self
            .store
            .replace_legacy_logs(&logs)
            .map_err(Self::store_err(MigrationStep::ReplaceLogs))?;
        tracing::info!("Deleted {} legacy logs, inserted {} logs", logs_deleted, logs_created);

        self.enter(MigrationStep::Done);
        let mut report =
            MigrationReport::new(MigrationOutcome::Completed, check, self.steps.clone());
        report.backed_up = backed_up;
        report.incidents_created = incidents_created;
        report.logs_deleted = logs_deleted;
        report.logs_created = logs_created;
        Ok(report)
    }
}
