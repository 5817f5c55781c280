//! Lab results module.
//!
//! Lab values are flagged against their reference range on read and can be
//! turned into chart-ready trend series.

pub mod flagging;
pub mod trends;
pub mod types;

pub use flagging::{flag, LabFlag, ReferenceRange};
pub use trends::{lab_trends, LabTrendPoint, LabTrendReport, TrendReferenceRanges};
pub use types::{CustomLabResult, CustomValue, LabMeasurement, LabResult};
