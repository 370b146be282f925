//! Report database operations.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::patients::patient_exists;
use super::{Database, DbError, DbResult};
use crate::models::{PatientId, Report, ReportId};

impl Database {
    /// Find-or-create the report for a patient on a date.
    ///
    /// Notes are only stored when the report is first created.
    pub fn ensure_report(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> DbResult<ReportId> {
        let tx = self.conn.unchecked_transaction()?;
        let id = ensure_report_in(&tx, patient_id, date, notes)?;
        tx.commit()?;
        Ok(id)
    }

    /// Get a report by ID.
    pub fn get_report(&self, id: ReportId) -> DbResult<Option<Report>> {
        self.conn
            .query_row(
                "SELECT id, patient_id, report_date, notes FROM reports WHERE id = ?",
                [id],
                report_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List a patient's reports, most recent first.
    pub fn list_reports(&self, patient_id: PatientId) -> DbResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, report_date, notes
            FROM reports
            WHERE patient_id = ?
            ORDER BY report_date DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], report_from_row)?;
        let reports = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(patient_id, count = reports.len(), "Listed reports");
        Ok(reports)
    }
}

pub(crate) fn ensure_report_in(
    conn: &Connection,
    patient_id: PatientId,
    date: NaiveDate,
    notes: Option<&str>,
) -> DbResult<ReportId> {
    if !patient_exists(conn, patient_id)? {
        warn!(patient_id, "Rejected report for unknown patient");
        return Err(DbError::Referential {
            entity: "patient",
            id: patient_id,
        });
    }

    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    let inserted = conn.execute(
        r#"
        INSERT INTO reports (patient_id, report_date, notes)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(patient_id, report_date) DO NOTHING
        "#,
        params![patient_id, date, notes],
    )?;

    let id: ReportId = conn.query_row(
        "SELECT id FROM reports WHERE patient_id = ?1 AND report_date = ?2",
        params![patient_id, date],
        |row| row.get(0),
    )?;

    if inserted > 0 {
        info!(report_id = id, patient_id, %date, "Created report");
    } else {
        debug!(report_id = id, patient_id, %date, "Reusing existing report");
    }
    Ok(id)
}

pub(crate) fn report_exists(conn: &Connection, id: ReportId) -> DbResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM reports WHERE id = ?", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        date: row.get(2)?,
        notes: row.get(3)?,
    })
}
