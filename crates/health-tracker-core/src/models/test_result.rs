//! Lab test result models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::report::ReportId;

/// Row id of a test result.
pub type TestResultId = i64;

/// Classification of a value against its normal range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Below the lower bound
    Low,
    /// Above the upper bound
    High,
    /// Within the inclusive range
    Normal,
    /// Test name is not in the reference catalog
    Unknown,
}

impl Status {
    /// Stored label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Low => "LOW",
            Status::High => "HIGH",
            Status::Normal => "NORMAL",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Whether the value fell outside its normal range.
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Status::Low | Status::High)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown status label: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Status::Low),
            "HIGH" => Ok(Status::High),
            "NORMAL" => Ok(Status::Normal),
            "UNKNOWN" => Ok(Status::Unknown),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// One measured value within a report.
///
/// `unit` and `status` are snapshots taken at insert time and are never
/// recomputed from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub id: TestResultId,
    /// Owning report
    pub report_id: ReportId,
    pub test_name: String,
    pub value: f64,
    pub unit: String,
    pub status: Status,
}

/// Check that a measured value may be persisted.
///
/// Zero, negative and non-finite values mean "not measured".
pub fn is_measured(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
