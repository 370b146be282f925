//! Report models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patient::PatientId;

/// Row id of a report.
pub type ReportId = i64;

/// A dated collection of lab results for one patient.
///
/// There is at most one report per `(patient_id, date)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub id: ReportId,
    /// Owning patient
    pub patient_id: PatientId,
    /// Calendar date the samples were taken
    pub date: NaiveDate,
    /// Notes entered when the report was first created
    pub notes: Option<String>,
}
