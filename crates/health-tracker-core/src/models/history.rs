//! Trend history models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::test_result::Status;
use crate::catalog::NormalRange;

/// One sample in a per-test time series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    /// Date of the owning report
    pub date: NaiveDate,
    pub value: f64,
    pub unit: String,
    pub status: Status,
}

/// A chronological series ready for trend rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSeries {
    pub test_name: String,
    /// Display unit for the axis
    pub unit: String,
    /// Band to shade as normal, if the catalog knows this test
    pub normal_range: Option<NormalRange>,
    /// Oldest first
    pub points: Vec<HistoryPoint>,
}

impl TrendSeries {
    /// Whether the series has any recorded samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    /// Count of samples outside the normal range.
    pub fn abnormal_count(&self) -> usize {
        self.points.iter().filter(|p| p.status.is_abnormal()).count()
    }
}
