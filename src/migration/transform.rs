//! In-memory conversion from the flat log shape to incidents and logs.

use uuid::Uuid;

use crate::health::incidents::partition;
use crate::health::{
    HealthLogRecord, IncidentStatusFlags, NormalizedIncident, NormalizedIssueType, NormalizedLog,
    SymptomQuestionnaire, TreatmentHistory,
};

/// Output of [`transform`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    pub incidents: Vec<NormalizedIncident>,
    pub logs: Vec<NormalizedLog>,
}

/// Build one incident per key and one normalized log per entry.
///
/// Entries lacking a key or timestamp are skipped; callers are expected to
/// have rejected them already. Incident IDs are freshly generated, log IDs
/// and timestamps are kept.
pub fn transform(records: &[HealthLogRecord]) -> Transformed {
    let (groups, _) = partition(records);
    let mut out = Transformed::default();

    for (_, group) in groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let Some(date_started) = first.timestamp else {
            continue;
        };

        let incident_id = Uuid::new_v4();
        let pain_locations = if first.body_area.is_empty() {
            Vec::new()
        } else {
            vec![first.body_area.clone()]
        };

        out.incidents.push(NormalizedIncident {
            id: incident_id,
            pain_locations,
            pain_intensity: first.pain_level,
            date_started,
            injury_source: String::new(),
            description: first.description.clone(),
            symptoms: SymptomQuestionnaire {
                status: IncidentStatusFlags::from_initial(first.status),
                ..Default::default()
            },
            treatments: TreatmentHistory::default(),
            status: IncidentStatusFlags::from_latest(last.status),
            created_at: first.created_at,
            updated_at: last.updated_at,
        });

        out.logs.extend(group.iter().filter_map(|record| {
            Some(NormalizedLog {
                id: record.id,
                timestamp: record.timestamp?,
                incident_id,
                issue_type: NormalizedIssueType::Update,
                description: record.description.clone(),
                created_at: record.created_at,
                updated_at: record.updated_at,
            })
        }));
    }

    out
}
