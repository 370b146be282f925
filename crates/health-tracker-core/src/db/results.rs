//! Test result database operations.

use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use super::reports::report_exists;
use super::{Database, DbError, DbResult};
use crate::models::{is_measured, HistoryPoint, PatientId, ReportId, Status, TestResult, TestResultId};

impl Database {
    /// Append a result to a report.
    ///
    /// There is no dedup by test name: submitting the same test twice for a
    /// report stores two rows. `unit` and `status` are stored as given.
    pub fn add_test_result(
        &self,
        report_id: ReportId,
        test_name: &str,
        value: f64,
        unit: &str,
        status: Status,
    ) -> DbResult<TestResultId> {
        let tx = self.conn.unchecked_transaction()?;
        let id = add_test_result_in(&tx, report_id, test_name, value, unit, status)?;
        tx.commit()?;
        Ok(id)
    }

    /// List the results in a report, ordered by test name.
    pub fn list_tests(&self, report_id: ReportId) -> DbResult<Vec<TestResult>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, report_id, test_name, value, unit, status
            FROM tests
            WHERE report_id = ?
            ORDER BY test_name, id
            "#,
        )?;

        let rows = stmt.query_map([report_id], |row| {
            Ok(TestResultRow {
                id: row.get(0)?,
                report_id: row.get(1)?,
                test_name: row.get(2)?,
                value: row.get(3)?,
                unit: row.get(4)?,
                status: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?.try_into()?);
        }
        Ok(results)
    }

    /// Distinct test names ever recorded for a patient, ascending.
    pub fn list_distinct_test_names(&self, patient_id: PatientId) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT t.test_name
            FROM tests t
            JOIN reports r ON t.report_id = r.id
            WHERE r.patient_id = ?
            ORDER BY t.test_name
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every recorded sample of one test for a patient, oldest first.
    ///
    /// Several samples on the same date are all returned, in insertion order.
    pub fn test_history(&self, patient_id: PatientId, test_name: &str) -> DbResult<Vec<HistoryPoint>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.report_date, t.value, t.unit, t.status
            FROM tests t
            JOIN reports r ON t.report_id = r.id
            WHERE r.patient_id = ?1 AND t.test_name = ?2
            ORDER BY r.report_date ASC, t.id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![patient_id, test_name], history_from_row)?;

        let mut points = Vec::new();
        for row in rows {
            let (date, value, unit, status) = row?;
            points.push(HistoryPoint {
                date,
                value,
                unit,
                status: parse_status(&status)?,
            });
        }
        debug!(patient_id, test_name, count = points.len(), "Loaded test history");
        Ok(points)
    }
}

pub(crate) fn add_test_result_in(
    conn: &Connection,
    report_id: ReportId,
    test_name: &str,
    value: f64,
    unit: &str,
    status: Status,
) -> DbResult<TestResultId> {
    let test_name = test_name.trim();
    if test_name.is_empty() {
        warn!(report_id, "Rejected result with blank test name");
        return Err(DbError::Validation("test name is required".into()));
    }
    if !is_measured(value) {
        warn!(report_id, test_name, value, "Rejected unmeasured value");
        return Err(DbError::Validation(format!(
            "value for '{}' must be a positive number, got {}",
            test_name, value
        )));
    }
    if !report_exists(conn, report_id)? {
        warn!(report_id, "Rejected result for unknown report");
        return Err(DbError::Referential {
            entity: "report",
            id: report_id,
        });
    }

    conn.execute(
        r#"
        INSERT INTO tests (report_id, test_name, value, unit, status)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![report_id, test_name, value, unit, status.as_str()],
    )?;
    let id = conn.last_insert_rowid();
    debug!(result_id = id, report_id, test_name, %status, "Recorded test result");
    Ok(id)
}

type HistoryRow = (chrono::NaiveDate, f64, String, String);

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

/// Intermediate row struct for database mapping.
struct TestResultRow {
    id: TestResultId,
    report_id: ReportId,
    test_name: String,
    value: f64,
    unit: String,
    status: String,
}

impl TryFrom<TestResultRow> for TestResult {
    type Error = DbError;

    fn try_from(row: TestResultRow) -> Result<Self, Self::Error> {
        Ok(TestResult {
            id: row.id,
            report_id: row.report_id,
            test_name: row.test_name,
            value: row.value,
            unit: row.unit,
            status: parse_status(&row.status)?,
        })
    }
}

fn parse_status(s: &str) -> Result<Status, DbError> {
    s.parse()
        .map_err(|_| DbError::Constraint(format!("Unknown test status: {}", s)))
}
