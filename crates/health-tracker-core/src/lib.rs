//! Health Tracker Core Library
//!
//! Local-first family lab-result tracker: patients, dated reports, classified
//! test results and per-test trend history.
//!
//! # Architecture
//!
//! ```text
//!  Report form ──► ReportRecorder ──► Classifier ◄── ReferenceCatalog (static)
//!                       │                                    │
//!                       ▼                                    │
//!                ┌──────────────┐                            │
//!                │ Record Store │  patients ─< reports ─< tests
//!                │   (SQLite)   │                            │
//!                └──────┬───────┘                            │
//!                       ▼                                    ▼
//!                 HistoryAssembler ──► TrendSeries (+ normal band)
//!                       │
//!                       └──► health context (last N reports, read-only)
//! ```
//!
//! # Core Principle
//!
//! **Unit and status are frozen at insert time.** Editing the catalog never
//! reclassifies stored results.
//!
//! # Modules
//!
//! - [`catalog`]: Reference catalog of tests, units and normal ranges
//! - [`classifier`]: Range classification of measured values
//! - [`db`]: SQLite record store with find-or-create semantics
//! - [`history`]: Time series and report context assembly
//! - [`recorder`]: Atomic report submission workflow
//! - [`models`]: Domain types (Patient, Report, TestResult, etc.)
//! - [`config`]: Environment-driven configuration

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod db;
pub mod history;
pub mod models;
pub mod recorder;

// Re-export commonly used types
pub use catalog::{CatalogError, Category, NormalRange, ReferenceCatalog, TestDefinition};
pub use classifier::{Classification, Classifier};
pub use config::TrackerConfig;
pub use db::{Database, DbError};
pub use history::HistoryAssembler;
pub use models::{
    HistoryPoint, Patient, PatientId, Report, ReportId, Status, TestResult, TestResultId,
    TrendSeries,
};
pub use recorder::{EnteredValue, ReportRecorder, ReportSubmission, SubmissionSummary};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HealthTrackerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for HealthTrackerError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Validation(msg) => HealthTrackerError::InvalidInput(msg),
            db::DbError::Referential { .. } => HealthTrackerError::NotFound(e.to_string()),
            other => HealthTrackerError::DatabaseError(other.to_string()),
        }
    }
}

impl From<catalog::CatalogError> for HealthTrackerError {
    fn from(e: catalog::CatalogError) -> Self {
        HealthTrackerError::CatalogError(e.to_string())
    }
}

impl From<config::ConfigError> for HealthTrackerError {
    fn from(e: config::ConfigError) -> Self {
        HealthTrackerError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for HealthTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HealthTrackerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, HealthTrackerError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| HealthTrackerError::InvalidInput(format!("bad date '{}': {}", date, e)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a tracker database at the given path with the built-in catalog.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<HealthTrackerCore>, HealthTrackerError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(HealthTrackerCore::new(
        db,
        ReferenceCatalog::standard(),
        history::DEFAULT_CONTEXT_REPORTS,
    )))
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<HealthTrackerCore>, HealthTrackerError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(HealthTrackerCore::new(
        db,
        ReferenceCatalog::standard(),
        history::DEFAULT_CONTEXT_REPORTS,
    )))
}

/// Open a tracker configured from `HEALTH_TRACKER_*` environment variables.
#[uniffi::export]
pub fn open_tracker_from_env() -> Result<Arc<HealthTrackerCore>, HealthTrackerError> {
    let config = TrackerConfig::from_env()?;
    Ok(Arc::new(HealthTrackerCore::from_config(&config)?))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe tracker wrapper for FFI.
#[derive(uniffi::Object)]
pub struct HealthTrackerCore {
    db: Arc<Mutex<Database>>,
    catalog: Arc<ReferenceCatalog>,
    classifier: Classifier,
    context_report_limit: usize,
}

impl HealthTrackerCore {
    /// Wrap an open database and a catalog.
    pub fn new(db: Database, catalog: ReferenceCatalog, context_report_limit: usize) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            db: Arc::new(Mutex::new(db)),
            classifier: Classifier::new(Arc::clone(&catalog)),
            catalog,
            context_report_limit,
        }
    }

    /// Open the configured database and catalog.
    pub fn from_config(config: &TrackerConfig) -> Result<Self, HealthTrackerError> {
        let catalog = config.load_catalog()?;
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(db, catalog, config.context_report_limit))
    }

    /// Shared reference catalog.
    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }
}

#[uniffi::export]
impl HealthTrackerCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Find or create a patient by name; returns the patient ID.
    pub fn ensure_patient(
        &self,
        name: String,
        age: u32,
        gender: String,
    ) -> Result<i64, HealthTrackerError> {
        let db = self.db.lock()?;
        Ok(db.ensure_patient(&name, age, &gender)?)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: i64) -> Result<Option<FfiPatient>, HealthTrackerError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List all patients by name.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, HealthTrackerError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Find or create the report for a patient on a `YYYY-MM-DD` date.
    pub fn ensure_report(
        &self,
        patient_id: i64,
        date: String,
        notes: Option<String>,
    ) -> Result<i64, HealthTrackerError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        Ok(db.ensure_report(patient_id, date, notes.as_deref())?)
    }

    /// List a patient's reports, most recent first.
    pub fn list_reports(&self, patient_id: i64) -> Result<Vec<FfiReport>, HealthTrackerError> {
        let db = self.db.lock()?;
        let reports = db.list_reports(patient_id)?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    /// Submit a batch of entered values for one date.
    pub fn submit_report(
        &self,
        patient_id: i64,
        date: String,
        notes: Option<String>,
        values: Vec<FfiEnteredValue>,
    ) -> Result<FfiSubmissionSummary, HealthTrackerError> {
        let submission = ReportSubmission {
            patient_id,
            date: parse_date(&date)?,
            notes,
            values: values.into_iter().map(|v| v.into()).collect(),
        };
        let mut db = self.db.lock()?;
        let summary = ReportRecorder::new(&mut *db, &self.classifier).submit(&submission)?;
        Ok(summary.into())
    }

    // =========================================================================
    // Test Result Operations
    // =========================================================================

    /// Append a result with an explicit unit and status label.
    pub fn add_test_result(
        &self,
        report_id: i64,
        test_name: String,
        value: f64,
        unit: String,
        status: String,
    ) -> Result<i64, HealthTrackerError> {
        let status: Status = status
            .parse()
            .map_err(|e: models::ParseStatusError| HealthTrackerError::InvalidInput(e.to_string()))?;
        let db = self.db.lock()?;
        Ok(db.add_test_result(report_id, &test_name, value, &unit, status)?)
    }

    /// List the results in a report by test name.
    pub fn list_tests(&self, report_id: i64) -> Result<Vec<FfiTestResult>, HealthTrackerError> {
        let db = self.db.lock()?;
        let tests = db.list_tests(report_id)?;
        Ok(tests.into_iter().map(|t| t.into()).collect())
    }

    /// Test names ever recorded for a patient.
    pub fn list_test_names(&self, patient_id: i64) -> Result<Vec<String>, HealthTrackerError> {
        let db = self.db.lock()?;
        Ok(db.list_distinct_test_names(patient_id)?)
    }

    // =========================================================================
    // History Operations
    // =========================================================================

    /// Samples of one test for a patient, oldest first.
    pub fn test_history(
        &self,
        patient_id: i64,
        test_name: String,
    ) -> Result<Vec<FfiHistoryPoint>, HealthTrackerError> {
        let db = self.db.lock()?;
        let assembler = HistoryAssembler::new(&db, &self.catalog);
        let points = assembler.test_history(patient_id, &test_name)?;
        Ok(points.into_iter().map(|p| p.into()).collect())
    }

    /// Trend series with the normal band for charting.
    pub fn trend(
        &self,
        patient_id: i64,
        test_name: String,
    ) -> Result<FfiTrendSeries, HealthTrackerError> {
        let db = self.db.lock()?;
        let assembler = HistoryAssembler::new(&db, &self.catalog);
        Ok(assembler.trend(patient_id, &test_name)?.into())
    }

    /// Text context of the most recent reports, or `None` without reports.
    pub fn health_context(
        &self,
        patient_id: i64,
        max_reports: Option<u32>,
    ) -> Result<Option<String>, HealthTrackerError> {
        let limit = max_reports
            .map(|n| n as usize)
            .unwrap_or(self.context_report_limit);
        let db = self.db.lock()?;
        let assembler = HistoryAssembler::new(&db, &self.catalog);
        Ok(assembler.health_context(patient_id, limit)?)
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Classify a value; returns the status label.
    pub fn classify(&self, test_name: String, value: f64) -> String {
        self.classifier.classify(&test_name, value).to_string()
    }

    /// Catalog categories with their tests, in declaration order.
    pub fn list_categories(&self) -> Vec<FfiCategory> {
        self.catalog
            .categories()
            .iter()
            .cloned()
            .map(|c| c.into())
            .collect()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub display_label: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            display_label: patient.display_label(),
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
        }
    }
}

/// FFI-safe report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReport {
    pub id: i64,
    pub patient_id: i64,
    /// ISO `YYYY-MM-DD`
    pub date: String,
    pub notes: Option<String>,
}

impl From<Report> for FfiReport {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            patient_id: report.patient_id,
            date: report.date.to_string(),
            notes: report.notes,
        }
    }
}

/// FFI-safe test result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTestResult {
    pub id: i64,
    pub report_id: i64,
    pub test_name: String,
    pub value: f64,
    pub unit: String,
    pub status: String,
}

impl From<TestResult> for FfiTestResult {
    fn from(result: TestResult) -> Self {
        Self {
            id: result.id,
            report_id: result.report_id,
            test_name: result.test_name,
            value: result.value,
            unit: result.unit,
            status: result.status.to_string(),
        }
    }
}

/// FFI-safe history point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryPoint {
    pub date: String,
    pub value: f64,
    pub unit: String,
    pub status: String,
}

impl From<HistoryPoint> for FfiHistoryPoint {
    fn from(point: HistoryPoint) -> Self {
        Self {
            date: point.date.to_string(),
            value: point.value,
            unit: point.unit,
            status: point.status.to_string(),
        }
    }
}

/// FFI-safe trend series.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrendSeries {
    pub test_name: String,
    pub unit: String,
    pub normal_low: Option<f64>,
    pub normal_high: Option<f64>,
    pub points: Vec<FfiHistoryPoint>,
}

impl From<TrendSeries> for FfiTrendSeries {
    fn from(series: TrendSeries) -> Self {
        Self {
            test_name: series.test_name,
            unit: series.unit,
            normal_low: series.normal_range.map(|r| r.low),
            normal_high: series.normal_range.map(|r| r.high),
            points: series.points.into_iter().map(|p| p.into()).collect(),
        }
    }
}

/// FFI-safe catalog test definition.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTestDefinition {
    pub name: String,
    pub unit: String,
    pub normal_low: f64,
    pub normal_high: f64,
}

impl From<TestDefinition> for FfiTestDefinition {
    fn from(def: TestDefinition) -> Self {
        Self {
            name: def.name,
            unit: def.unit,
            normal_low: def.normal_range.low,
            normal_high: def.normal_range.high,
        }
    }
}

/// FFI-safe catalog category.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategory {
    pub label: String,
    pub tests: Vec<FfiTestDefinition>,
}

impl From<Category> for FfiCategory {
    fn from(category: Category) -> Self {
        Self {
            label: category.label,
            tests: category.tests.into_iter().map(|t| t.into()).collect(),
        }
    }
}

/// FFI-safe entered value.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEnteredValue {
    pub test_name: String,
    pub value: f64,
}

impl From<FfiEnteredValue> for EnteredValue {
    fn from(value: FfiEnteredValue) -> Self {
        EnteredValue {
            test_name: value.test_name,
            value: value.value,
        }
    }
}

/// FFI-safe submission summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmissionSummary {
    pub report_id: i64,
    pub recorded: Vec<FfiTestResult>,
    pub skipped: Vec<String>,
}

impl From<SubmissionSummary> for FfiSubmissionSummary {
    fn from(summary: SubmissionSummary) -> Self {
        Self {
            report_id: summary.report_id,
            recorded: summary.recorded.into_iter().map(|r| r.into()).collect(),
            skipped: summary.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_end_to_end() {
        let core = open_tracker_in_memory().unwrap();

        let pid = core.ensure_patient("Asha".into(), 34, "F".into()).unwrap();
        let summary = core
            .submit_report(
                pid,
                "2024-01-10".into(),
                None,
                vec![
                    FfiEnteredValue {
                        test_name: "Fasting Glucose".into(),
                        value: 95.0,
                    },
                    FfiEnteredValue {
                        test_name: "HbA1c".into(),
                        value: 0.0,
                    },
                ],
            )
            .unwrap();
        assert_eq!(summary.recorded.len(), 1);
        assert_eq!(summary.skipped, vec!["HbA1c"]);

        let trend = core.trend(pid, "Fasting Glucose".into()).unwrap();
        assert_eq!(trend.normal_low, Some(70.0));
        assert_eq!(trend.normal_high, Some(100.0));
        assert_eq!(trend.points[0].date, "2024-01-10");
        assert_eq!(trend.points[0].status, "NORMAL");

        let patients = core.list_patients().unwrap();
        assert_eq!(patients[0].display_label, "Asha (34 / F)");
    }

    #[test]
    fn test_ffi_error_mapping() {
        let core = open_tracker_in_memory().unwrap();

        assert!(matches!(
            core.ensure_patient("  ".into(), 30, "F".into()),
            Err(HealthTrackerError::InvalidInput(_))
        ));
        assert!(matches!(
            core.ensure_report(42, "2024-01-10".into(), None),
            Err(HealthTrackerError::NotFound(_))
        ));
        assert!(matches!(
            core.ensure_report(42, "10/01/2024".into(), None),
            Err(HealthTrackerError::InvalidInput(_))
        ));

        let pid = core.ensure_patient("Asha".into(), 34, "F".into()).unwrap();
        let rid = core.ensure_report(pid, "2024-01-10".into(), None).unwrap();
        assert!(matches!(
            core.add_test_result(rid, "BUN".into(), 10.0, "mg/dL".into(), "fine".into()),
            Err(HealthTrackerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ffi_catalog_access() {
        let core = open_tracker_in_memory().unwrap();

        assert_eq!(core.classify("Sodium".into(), 150.0), "HIGH");
        assert_eq!(core.classify("NoSuchTest".into(), 1.0), "UNKNOWN");

        let categories = core.list_categories();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0].label, "Blood Sugar");
        assert_eq!(categories[0].tests[0].name, "Fasting Glucose");
        assert_eq!(categories[0].tests[0].unit, "mg/dL");
    }

    #[test]
    fn test_ffi_health_context_limit() {
        let core = open_tracker_in_memory().unwrap();
        let pid = core.ensure_patient("Asha".into(), 34, "F".into()).unwrap();
        assert!(core.health_context(pid, None).unwrap().is_none());

        for day in 1..=7 {
            let rid = core
                .ensure_report(pid, format!("2024-01-{:02}", day), None)
                .unwrap();
            core.add_test_result(rid, "Sodium".into(), 140.0, "mmol/L".into(), "NORMAL".into())
                .unwrap();
        }

        let context = core.health_context(pid, None).unwrap().unwrap();
        assert_eq!(context.lines().count(), 5);
        let context = core.health_context(pid, Some(2)).unwrap().unwrap();
        assert_eq!(context.lines().count(), 2);
    }
}
