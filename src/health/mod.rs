//! Health logs and incidents.
//!
//! Legacy log entries are grouped into incidents by a free-text key. After
//! migration, incidents are stored in their own table with a nested intake
//! questionnaire and logs reference them by ID.

pub mod incidents;
pub mod normalized;
pub mod query;
pub mod types;

pub use incidents::{group_into_incidents, DataQualityIssue, DataQualityWarning, GroupingOutcome};
pub use normalized::{
    IncidentStatusFlags, NormalizedIncident, NormalizedIssueType, NormalizedLog,
    SymptomQuestionnaire, TreatmentHistory,
};
pub use query::{IncidentQuery, LogFilter, LogPage, LogSortField, LogVocabulary, SortOrder};
pub use types::{HealthLogRecord, IncidentSummary, LogStatus, LogValidationError, NewHealthLog};
