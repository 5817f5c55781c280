//! Chart-ready lab trend series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::flagging::{LabFlag, ReferenceRange};
use super::types::{LabMeasurement, LabResult};

/// One point on the lipid trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTrendPoint {
    pub date: NaiveDate,
    /// Human readable label, e.g. "Mar 4, 2025".
    pub date_label: String,
    pub total_cholesterol: Option<f64>,
    pub total_cholesterol_flag: Option<LabFlag>,
    pub ldl: Option<f64>,
    pub ldl_flag: Option<LabFlag>,
    pub hdl: Option<f64>,
    pub hdl_flag: Option<LabFlag>,
    pub triglycerides: Option<f64>,
    pub triglycerides_flag: Option<LabFlag>,
    pub ordered_by: String,
    pub notes: Option<String>,
}

/// Reference ranges shown as chart bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReferenceRanges {
    pub total_cholesterol: Option<ReferenceRange>,
    pub ldl: Option<ReferenceRange>,
    pub hdl: Option<ReferenceRange>,
    pub triglycerides: Option<ReferenceRange>,
}

/// Trend series for a single test type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTrendReport {
    pub test_type: String,
    pub points: Vec<LabTrendPoint>,
    /// Taken from the most recent result; `None` when there are no results.
    pub reference_ranges: Option<TrendReferenceRanges>,
}

impl LabTrendReport {
    pub fn count(&self) -> usize {
        self.points.len()
    }
}

fn value_and_flag(m: Option<&LabMeasurement>) -> (Option<f64>, Option<LabFlag>) {
    match m {
        Some(m) => (Some(m.value), Some(m.flag())),
        None => (None, None),
    }
}

/// Build the trend series for `test_type`, oldest result first.
pub fn lab_trends(results: &[LabResult], test_type: &str) -> LabTrendReport {
    let mut matching: Vec<&LabResult> = results
        .iter()
        .filter(|r| r.test_type == test_type)
        .collect();
    matching.sort_by_key(|r| r.test_date);

    let points = matching
        .iter()
        .map(|r| {
            let (total_cholesterol, total_cholesterol_flag) =
                value_and_flag(r.total_cholesterol.as_ref());
            let (ldl, ldl_flag) = value_and_flag(r.ldl_cholesterol.as_ref());
            let (hdl, hdl_flag) = value_and_flag(r.hdl_cholesterol.as_ref());
            let (triglycerides, triglycerides_flag) = value_and_flag(r.triglycerides.as_ref());

            LabTrendPoint {
                date: r.test_date,
                date_label: r.test_date.format("%b %-d, %Y").to_string(),
                total_cholesterol,
                total_cholesterol_flag,
                ldl,
                ldl_flag,
                hdl,
                hdl_flag,
                triglycerides,
                triglycerides_flag,
                ordered_by: r.ordered_by.clone(),
                notes: r.notes.clone(),
            }
        })
        .collect();

    let reference_ranges = matching.last().map(|latest| TrendReferenceRanges {
        total_cholesterol: latest.total_cholesterol.as_ref().map(|m| m.reference_range),
        ldl: latest.ldl_cholesterol.as_ref().map(|m| m.reference_range),
        hdl: latest.hdl_cholesterol.as_ref().map(|m| m.reference_range),
        triglycerides: latest.triglycerides.as_ref().map(|m| m.reference_range),
    });

    LabTrendReport {
        test_type: test_type.to_string(),
        points,
        reference_ranges,
    }
}
