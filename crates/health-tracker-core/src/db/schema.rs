//! SQLite schema definition.

/// Complete database schema for the health tracker.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients (create-or-reuse by name)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    age INTEGER NOT NULL CHECK (age >= 0),
    gender TEXT NOT NULL DEFAULT ''
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Reports (one per patient per date)
-- ============================================================================

CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id),
    report_date TEXT NOT NULL,                   -- ISO YYYY-MM-DD
    notes TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_reports_patient_date ON reports(patient_id, report_date);

-- ============================================================================
-- Test results (insert-only; unit and status frozen at insert)
-- ============================================================================

CREATE TABLE IF NOT EXISTS tests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    report_id INTEGER NOT NULL REFERENCES reports(id),
    test_name TEXT NOT NULL,
    value REAL NOT NULL CHECK (value > 0),
    unit TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL CHECK (status IN ('LOW', 'HIGH', 'NORMAL', 'UNKNOWN'))
);

CREATE INDEX IF NOT EXISTS idx_tests_report ON tests(report_id);
CREATE INDEX IF NOT EXISTS idx_tests_name ON tests(test_name);
"#;
