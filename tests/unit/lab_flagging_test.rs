//! Unit tests for lab value flagging and trend series.

use chrono::NaiveDate;
use healthlog::labs::{
    flag, lab_trends, CustomLabResult, CustomValue, LabFlag, LabMeasurement, LabResult,
    ReferenceRange,
};

#[test]
fn test_ldl_flags() {
    let ldl = ReferenceRange::new(0.0, 100.0);

    assert_eq!(flag(95.0, ldl), LabFlag::Normal);
    assert_eq!(flag(162.0, ldl), LabFlag::High);
}

#[test]
fn test_hdl_below_minimum_is_low() {
    assert_eq!(flag(35.0, ReferenceRange::new(40.0, 200.0)), LabFlag::Low);
}

#[test]
fn test_boundaries_are_normal() {
    let range = ReferenceRange::new(40.0, 100.0);

    assert_eq!(flag(40.0, range), LabFlag::Normal);
    assert_eq!(flag(100.0, range), LabFlag::Normal);
    assert!(range.contains(40.0));
    assert!(!range.contains(100.1));
}

#[test]
fn test_degenerate_range() {
    let range = ReferenceRange::new(5.0, 5.0);

    assert_eq!(flag(5.0, range), LabFlag::Normal);
    assert_eq!(flag(4.9, range), LabFlag::Low);
    assert_eq!(flag(5.1, range), LabFlag::High);
}

#[test]
fn test_abnormal_count_includes_custom_results() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let mut result = LabResult::new(date, "lipid_panel", "Dr. Chen");
    result.total_cholesterol = Some(LabMeasurement::new(
        180.0,
        "mg/dL",
        ReferenceRange::new(0.0, 200.0),
    ));
    result.triglycerides = Some(LabMeasurement::new(
        210.0,
        "mg/dL",
        ReferenceRange::new(0.0, 150.0),
    ));
    result.custom_results = vec![
        CustomLabResult {
            test_name: "Vitamin D".to_string(),
            value: CustomValue::Number(18.0),
            unit: Some("ng/mL".to_string()),
            min: Some(30.0),
            max: None,
        },
        CustomLabResult {
            test_name: "Urinalysis".to_string(),
            value: CustomValue::Text("negative".to_string()),
            unit: None,
            min: None,
            max: None,
        },
    ];

    assert_eq!(result.lipid_measurements().len(), 2);
    assert_eq!(result.custom_results[0].flag(), Some(LabFlag::Low));
    assert_eq!(result.custom_results[1].flag(), None);
    assert_eq!(result.abnormal_count(), 2);
}

#[test]
fn test_trends_oldest_first_with_latest_ranges() {
    let mut older = LabResult::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), "lipid_panel", "Dr. Chen");
    older.ldl_cholesterol = Some(LabMeasurement::new(162.0, "mg/dL", ReferenceRange::new(0.0, 130.0)));
    let mut newer = LabResult::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), "lipid_panel", "Dr. Chen");
    newer.ldl_cholesterol = Some(LabMeasurement::new(95.0, "mg/dL", ReferenceRange::new(0.0, 100.0)));
    let other = LabResult::new(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), "metabolic", "Dr. Chen");

    let report = lab_trends(&[newer, other, older], "lipid_panel");

    assert_eq!(report.count(), 2);
    assert_eq!(report.points[0].ldl, Some(162.0));
    assert_eq!(report.points[0].ldl_flag, Some(LabFlag::High));
    assert_eq!(report.points[1].ldl_flag, Some(LabFlag::Normal));
    assert_eq!(report.points[1].date_label, "Mar 4, 2025");
    assert_eq!(
        report.reference_ranges.unwrap().ldl,
        Some(ReferenceRange::new(0.0, 100.0))
    );
}

#[test]
fn test_trends_empty() {
    let report = lab_trends(&[], "lipid_panel");
    assert_eq!(report.count(), 0);
    assert!(report.reference_ranges.is_none());
}
