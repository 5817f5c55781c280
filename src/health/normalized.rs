//! Normalized incident and log model.
//!
//! An incident owns its logs through a generated ID. The nested symptom and
//! treatment questionnaire mirrors the intake form; entries converted from the
//! flat legacy logs leave almost all of it at its defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::LogStatus;

/// A health incident with its intake questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIncident {
    pub id: Uuid,
    pub pain_locations: Vec<String>,
    pub pain_intensity: u8,
    pub date_started: DateTime<Utc>,
    /// How the injury happened; never known for converted entries
    pub injury_source: String,
    pub description: String,
    pub symptoms: SymptomQuestionnaire,
    pub treatments: TreatmentHistory,
    pub status: IncidentStatusFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A log entry attached to exactly one incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub incident_id: Uuid,
    pub issue_type: NormalizedIssueType,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedIssueType {
    Update,
    DoctorVisitNotes,
}

impl NormalizedIssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizedIssueType::Update => "update",
            NormalizedIssueType::DoctorVisitNotes => "doctor_visit_notes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "update" => Some(NormalizedIssueType::Update),
            "doctor_visit_notes" => Some(NormalizedIssueType::DoctorVisitNotes),
            _ => None,
        }
    }
}

/// Course of an incident. More than one flag may be set by hand; converted
/// entries get exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentStatusFlags {
    pub worsening: bool,
    pub resolved: bool,
    pub improving: bool,
    pub constant: bool,
    pub occasional: bool,
}

impl IncidentStatusFlags {
    /// Incident-level status from the most recent legacy log.
    pub fn from_latest(status: LogStatus) -> Self {
        match status {
            LogStatus::Active => Self {
                worsening: true,
                ..Default::default()
            },
            LogStatus::Resolved => Self {
                resolved: true,
                ..Default::default()
            },
            LogStatus::Improving => Self {
                improving: true,
                ..Default::default()
            },
        }
    }

    /// Questionnaire status as reported on the first legacy log.
    pub fn from_initial(status: LogStatus) -> Self {
        Self {
            resolved: status == LogStatus::Resolved,
            improving: status == LogStatus::Improving,
            constant: status == LogStatus::Active,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomQuestionnaire {
    pub pain_quality: PainQuality,
    pub other_symptoms: OtherSymptoms,
    pub sensations: Sensations,
    pub status: IncidentStatusFlags,
    pub timing: SymptomTiming,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainQuality {
    pub sharp: bool,
    pub dull: bool,
    pub throbbing: bool,
    pub stabbing: bool,
    pub aching: bool,
    pub heavy: bool,
    pub burning: bool,
    pub other: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSymptoms {
    pub stiffness: bool,
    pub instability: bool,
    pub catching: bool,
    pub popping: bool,
    pub locking: bool,
    pub other: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensations {
    pub bruising: bool,
    pub swelling: bool,
    pub numbness: bool,
    pub tingling: bool,
    pub weakness: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomTiming {
    pub when_most_severe: WhenMostSevere,
    pub what_makes_worse: WhatMakesWorse,
    pub what_makes_better: WhatMakesBetter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenMostSevere {
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
    pub consistent_all_day: bool,
    pub interrupts_sleep: bool,
    pub other: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatMakesWorse {
    pub rest: bool,
    pub activity: bool,
    pub sleeping: bool,
    pub kneeling: bool,
    pub other: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatMakesBetter {
    pub rest: bool,
    pub activity: bool,
    pub ice: bool,
    pub medication: bool,
    pub brace: bool,
    pub other: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentHistory {
    pub prior_physician: PriorPhysician,
    pub prior_surgery: PriorSurgery,
    pub treatments_tried: TreatmentsTried,
    pub studies_completed: StudiesCompleted,
}

/// `seen` is `None` when the question was never answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorPhysician {
    pub seen: Option<bool>,
    pub provider: String,
    pub when: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorSurgery {
    pub had: Option<bool>,
    pub surgery: String,
    pub when: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentOutcome {
    pub tried: bool,
    pub helpful: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentsTried {
    pub massage_therapy: TreatmentOutcome,
    pub physical_therapy: TreatmentOutcome,
    pub chiropractic_therapy: TreatmentOutcome,
    pub acupuncture: TreatmentOutcome,
    pub bracing: TreatmentOutcome,
    pub injections: TreatmentOutcome,
    pub medication: TreatmentOutcome,
    pub other: OtherTreatment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTreatment {
    pub tried: bool,
    pub helpful: Option<bool>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudiesCompleted {
    pub x_rays: bool,
    pub mri: bool,
    pub ct_scan: bool,
    pub emg_nerve_study: bool,
    pub bone_scan: bool,
    pub ultrasound: bool,
    pub other: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_status_mapping() {
        let active = IncidentStatusFlags::from_latest(LogStatus::Active);
        assert!(active.worsening && !active.resolved && !active.improving && !active.constant);

        assert!(IncidentStatusFlags::from_latest(LogStatus::Resolved).resolved);
        assert!(IncidentStatusFlags::from_latest(LogStatus::Improving).improving);
    }

    #[test]
    fn test_initial_status_marks_active_as_constant() {
        let flags = IncidentStatusFlags::from_initial(LogStatus::Active);
        assert!(flags.constant);
        assert!(!flags.worsening);
    }

    #[test]
    fn test_questionnaire_defaults_are_unanswered() {
        let history = TreatmentHistory::default();
        assert_eq!(history.prior_physician.seen, None);
        assert!(!history.treatments_tried.physical_therapy.tried);
        assert_eq!(history.treatments_tried.physical_therapy.helpful, None);

        let json = serde_json::to_value(SymptomQuestionnaire::default()).unwrap();
        assert_eq!(json["timing"]["when_most_severe"]["interrupts_sleep"], false);
    }

    #[test]
    fn test_issue_type_keys() {
        assert_eq!(
            NormalizedIssueType::parse(NormalizedIssueType::DoctorVisitNotes.as_str()),
            Some(NormalizedIssueType::DoctorVisitNotes)
        );
        assert_eq!(
            serde_json::to_string(&NormalizedIssueType::Update).unwrap(),
            "\"update\""
        );
    }
}
