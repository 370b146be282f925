//! History assembly: per-patient, per-test time series and report context.

use std::fmt::Write as _;

use tracing::debug;

use crate::catalog::ReferenceCatalog;
use crate::db::{Database, DbResult};
use crate::models::{HistoryPoint, PatientId, TrendSeries};

/// Reports included in a health context when the caller has no preference.
pub const DEFAULT_CONTEXT_REPORTS: usize = 5;

/// Joins stored results with report dates and catalog ranges.
pub struct HistoryAssembler<'a> {
    db: &'a Database,
    catalog: &'a ReferenceCatalog,
}

impl<'a> HistoryAssembler<'a> {
    pub fn new(db: &'a Database, catalog: &'a ReferenceCatalog) -> Self {
        Self { db, catalog }
    }

    /// All samples of a test for a patient, oldest first.
    ///
    /// Repeated samples on one date are kept as separate points.
    pub fn test_history(&self, patient_id: PatientId, test_name: &str) -> DbResult<Vec<HistoryPoint>> {
        self.db.test_history(patient_id, test_name)
    }

    /// History plus the normal band and display unit for charting.
    pub fn trend(&self, patient_id: PatientId, test_name: &str) -> DbResult<TrendSeries> {
        let points = self.test_history(patient_id, test_name)?;

        // Stored units win over the current catalog
        let unit = points
            .first()
            .map(|p| p.unit.clone())
            .or_else(|| self.catalog.unit_for(test_name).map(str::to_string))
            .unwrap_or_default();

        Ok(TrendSeries {
            test_name: test_name.to_string(),
            unit,
            normal_range: self.catalog.range_for(test_name),
            points,
        })
    }

    /// Trend series for every test the patient has on record, by name.
    pub fn all_trends(&self, patient_id: PatientId) -> DbResult<Vec<TrendSeries>> {
        self.db
            .list_distinct_test_names(patient_id)?
            .iter()
            .map(|name| self.trend(patient_id, name))
            .collect()
    }

    /// Plain-text summary of the most recent reports, newest first.
    ///
    /// One line per report:
    /// `Date: 2024-02-10 | Results: Fasting Glucose: 130 mg/dL (HIGH), ...`.
    /// Returns `None` when the patient has no reports.
    pub fn health_context(&self, patient_id: PatientId, max_reports: usize) -> DbResult<Option<String>> {
        let reports = self.db.list_reports(patient_id)?;
        if reports.is_empty() {
            return Ok(None);
        }

        let mut context = String::new();
        for report in reports.iter().take(max_reports) {
            let results = self.db.list_tests(report.id)?;
            let data_points = results
                .iter()
                .map(|t| format!("{}: {} {} ({})", t.test_name, t.value, t.unit, t.status))
                .collect::<Vec<_>>()
                .join(", ");
            // Writing to a String cannot fail
            let _ = writeln!(context, "Date: {} | Results: {}", report.date, data_points);
        }

        debug!(
            patient_id,
            reports = reports.len().min(max_reports),
            "Built health context"
        );
        Ok(Some(context))
    }
}
