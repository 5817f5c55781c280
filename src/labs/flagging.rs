//! Reference range flagging for lab measurements.

use serde::{Deserialize, Serialize};

/// Clinically expected band for a lab value. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    /// Create a new reference range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether the value falls inside the range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        flag(value, *self) == LabFlag::Normal
    }
}

/// Classification of a value against its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabFlag {
    Low,
    Normal,
    High,
}

impl LabFlag {
    /// Get display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            LabFlag::Low => "Low",
            LabFlag::Normal => "Normal",
            LabFlag::High => "High",
        }
    }

    /// Whether the value needs attention.
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, LabFlag::Normal)
    }
}

impl std::fmt::Display for LabFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Flag a value against a reference range.
///
/// Below `min` is low, above `max` is high, anything else (including both
/// boundaries and a NaN value) is normal.
pub fn flag(value: f64, range: ReferenceRange) -> LabFlag {
    if value < range.min {
        LabFlag::Low
    } else if value > range.max {
        LabFlag::High
    } else {
        LabFlag::Normal
    }
}
