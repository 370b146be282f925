//! Report submission workflow.
//!
//! Turns a batch of entered values into stored results: the report for the
//! date is found or created, unmeasured entries are skipped, and each kept
//! value gets its catalog unit and status frozen at insert time. The whole
//! batch commits in one transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::Classifier;
use crate::db::{add_test_result_in, ensure_report_in, Database, DbResult};
use crate::models::{is_measured, PatientId, ReportId, TestResult};

/// A value typed into the report form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnteredValue {
    pub test_name: String,
    /// Zero or blank means "not measured"
    pub value: f64,
}

impl EnteredValue {
    pub fn new(test_name: impl Into<String>, value: f64) -> Self {
        Self {
            test_name: test_name.into(),
            value,
        }
    }
}

/// Everything entered for one patient on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSubmission {
    pub patient_id: PatientId,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub values: Vec<EnteredValue>,
}

/// Outcome of a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionSummary {
    pub report_id: ReportId,
    /// Stored results, in entry order
    pub recorded: Vec<TestResult>,
    /// Test names skipped as not measured
    pub skipped: Vec<String>,
}

/// Records submissions against the store.
pub struct ReportRecorder<'a> {
    db: &'a mut Database,
    classifier: &'a Classifier,
}

impl<'a> ReportRecorder<'a> {
    pub fn new(db: &'a mut Database, classifier: &'a Classifier) -> Self {
        Self { db, classifier }
    }

    /// Store a submission atomically.
    ///
    /// Results are appended to an existing report for the same date.
    pub fn submit(&mut self, submission: &ReportSubmission) -> DbResult<SubmissionSummary> {
        let tx = self.db.transaction()?;

        let report_id = ensure_report_in(
            &tx,
            submission.patient_id,
            submission.date,
            submission.notes.as_deref(),
        )?;

        let mut recorded = Vec::new();
        let mut skipped = Vec::new();

        for entry in &submission.values {
            if !is_measured(entry.value) {
                skipped.push(entry.test_name.clone());
                continue;
            }

            let test_name = entry.test_name.trim();
            let snapshot = self.classifier.snapshot(test_name, entry.value);
            let id = add_test_result_in(
                &tx,
                report_id,
                test_name,
                entry.value,
                &snapshot.unit,
                snapshot.status,
            )?;
            recorded.push(TestResult {
                id,
                report_id,
                test_name: test_name.to_string(),
                value: entry.value,
                unit: snapshot.unit,
                status: snapshot.status,
            });
        }

        tx.commit()?;

        info!(
            report_id,
            patient_id = submission.patient_id,
            recorded = recorded.len(),
            skipped = skipped.len(),
            "Submitted report"
        );

        Ok(SubmissionSummary {
            report_id,
            recorded,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceCatalog;
    use crate::db::DbError;
    use crate::models::Status;
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn classifier() -> Classifier {
        Classifier::new(Arc::new(ReferenceCatalog::standard()))
    }

    #[test]
    fn test_submit_skips_unmeasured_and_classifies() {
        let mut db = Database::open_in_memory().unwrap();
        let pid = db.ensure_patient("Asha", 34, "F").unwrap();
        let classifier = classifier();

        let submission = ReportSubmission {
            patient_id: pid,
            date: date("2024-01-10"),
            notes: Some("fasting".into()),
            values: vec![
                EnteredValue::new("Fasting Glucose", 95.0),
                EnteredValue::new("PP Glucose", 0.0),
                EnteredValue::new("HbA1c", 6.1),
            ],
        };

        let summary = ReportRecorder::new(&mut db, &classifier)
            .submit(&submission)
            .unwrap();

        assert_eq!(summary.recorded.len(), 2);
        assert_eq!(summary.skipped, vec!["PP Glucose"]);
        assert_eq!(summary.recorded[0].status, Status::Normal);
        assert_eq!(summary.recorded[1].unit, "%");
        assert_eq!(summary.recorded[1].status, Status::High);

        let stored = db.list_tests(summary.report_id).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_second_submission_appends_to_same_report() {
        let mut db = Database::open_in_memory().unwrap();
        let pid = db.ensure_patient("Asha", 34, "F").unwrap();
        let classifier = classifier();

        let first = ReportSubmission {
            patient_id: pid,
            date: date("2024-01-10"),
            notes: None,
            values: vec![EnteredValue::new("Sodium", 140.0)],
        };
        let second = ReportSubmission {
            patient_id: pid,
            date: date("2024-01-10"),
            notes: Some("second category".into()),
            values: vec![EnteredValue::new("Hemoglobin", 13.2)],
        };

        let mut recorder = ReportRecorder::new(&mut db, &classifier);
        let a = recorder.submit(&first).unwrap();
        let b = recorder.submit(&second).unwrap();
        assert_eq!(a.report_id, b.report_id);

        assert_eq!(db.list_reports(pid).unwrap().len(), 1);
        assert_eq!(db.list_tests(a.report_id).unwrap().len(), 2);
    }

    #[test]
    fn test_uncatalogued_test_stored_as_unknown() {
        let mut db = Database::open_in_memory().unwrap();
        let pid = db.ensure_patient("Asha", 34, "F").unwrap();
        let classifier = classifier();

        let submission = ReportSubmission {
            patient_id: pid,
            date: date("2024-01-10"),
            notes: None,
            values: vec![EnteredValue::new("Vitamin B12", 300.0)],
        };
        let summary = ReportRecorder::new(&mut db, &classifier)
            .submit(&submission)
            .unwrap();

        assert_eq!(summary.recorded[0].status, Status::Unknown);
        assert_eq!(summary.recorded[0].unit, "");
    }

    #[test]
    fn test_failed_submission_leaves_no_rows() {
        let mut db = Database::open_in_memory().unwrap();
        let pid = db.ensure_patient("Asha", 34, "F").unwrap();
        let classifier = classifier();

        // Blank name fails validation after the report insert
        let submission = ReportSubmission {
            patient_id: pid,
            date: date("2024-01-10"),
            notes: None,
            values: vec![
                EnteredValue::new("Sodium", 140.0),
                EnteredValue::new("  ", 3.0),
            ],
        };
        let result = ReportRecorder::new(&mut db, &classifier).submit(&submission);
        assert!(matches!(result, Err(DbError::Validation(_))));

        assert!(db.list_reports(pid).unwrap().is_empty());
        assert!(db.list_distinct_test_names(pid).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_patient_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let classifier = classifier();

        let submission = ReportSubmission {
            patient_id: 77,
            date: date("2024-01-10"),
            notes: None,
            values: vec![EnteredValue::new("Sodium", 140.0)],
        };
        let result = ReportRecorder::new(&mut db, &classifier).submit(&submission);
        assert!(matches!(result, Err(DbError::Referential { .. })));
    }
}
