//! Lab result type definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::flagging::{flag, LabFlag, ReferenceRange};

/// A single numeric lab value with its reference range.
///
/// The flag is never stored; it is derived from value and range on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabMeasurement {
    pub value: f64,
    pub unit: String,
    pub reference_range: ReferenceRange,
}

impl LabMeasurement {
    /// Create a new measurement.
    pub fn new(value: f64, unit: impl Into<String>, reference_range: ReferenceRange) -> Self {
        Self {
            value,
            unit: unit.into(),
            reference_range,
        }
    }

    /// Flag for this measurement.
    pub fn flag(&self) -> LabFlag {
        flag(self.value, self.reference_range)
    }
}

/// Free-form lab result outside the lipid panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLabResult {
    pub test_name: String,
    pub value: CustomValue,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Custom result values may be qualitative ("negative").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Number(f64),
    Text(String),
}

impl CustomLabResult {
    /// Flag a numeric custom result. Open-ended ranges only check the bound
    /// that is present; text values and missing ranges have no flag.
    pub fn flag(&self) -> Option<LabFlag> {
        let value = match self.value {
            CustomValue::Number(v) => v,
            CustomValue::Text(_) => return None,
        };
        if self.min.is_none() && self.max.is_none() {
            return None;
        }
        let range = ReferenceRange::new(
            self.min.unwrap_or(f64::NEG_INFINITY),
            self.max.unwrap_or(f64::INFINITY),
        );
        Some(flag(value, range))
    }
}

/// A dated set of lab results from one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub id: Uuid,
    pub test_date: NaiveDate,
    /// e.g. "lipid_panel", "metabolic", "custom"
    pub test_type: String,
    pub ordered_by: String,
    pub lab_name: Option<String>,
    pub total_cholesterol: Option<LabMeasurement>,
    pub ldl_cholesterol: Option<LabMeasurement>,
    pub hdl_cholesterol: Option<LabMeasurement>,
    pub triglycerides: Option<LabMeasurement>,
    #[serde(default)]
    pub custom_results: Vec<CustomLabResult>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LabResult {
    /// Create an empty lab result.
    pub fn new(test_date: NaiveDate, test_type: impl Into<String>, ordered_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            test_date,
            test_type: test_type.into(),
            ordered_by: ordered_by.into(),
            lab_name: None,
            total_cholesterol: None,
            ldl_cholesterol: None,
            hdl_cholesterol: None,
            triglycerides: None,
            custom_results: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lipid panel measurements paired with their names, skipping absent ones.
    pub fn lipid_measurements(&self) -> Vec<(&'static str, &LabMeasurement)> {
        [
            ("total_cholesterol", self.total_cholesterol.as_ref()),
            ("ldl_cholesterol", self.ldl_cholesterol.as_ref()),
            ("hdl_cholesterol", self.hdl_cholesterol.as_ref()),
            ("triglycerides", self.triglycerides.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, m)| m.map(|m| (name, m)))
        .collect()
    }

    /// Number of out-of-range values across the lipid panel and custom results.
    pub fn abnormal_count(&self) -> usize {
        let lipids = self
            .lipid_measurements()
            .iter()
            .filter(|(_, m)| m.flag().is_abnormal())
            .count();
        let custom = self
            .custom_results
            .iter()
            .filter(|r| r.flag().map(|f| f.is_abnormal()).unwrap_or(false))
            .count();
        lipids + custom
    }
}
