//! Patient database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::{Database, DbError, DbResult};
use crate::models::{normalize_patient_name, Patient, PatientId};

impl Database {
    /// Find-or-create a patient by exact name.
    ///
    /// The name is trimmed first. An existing patient keeps its original age
    /// and gender.
    pub fn ensure_patient(&self, name: &str, age: u32, gender: &str) -> DbResult<PatientId> {
        let tx = self.conn.unchecked_transaction()?;
        let id = ensure_patient_in(&tx, name, age, gender)?;
        tx.commit()?;
        Ok(id)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: PatientId) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                "SELECT id, name, age, gender FROM patients WHERE id = ?",
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a patient by exact name.
    pub fn find_patient_by_name(&self, name: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                "SELECT id, name, age, gender FROM patients WHERE name = ?",
                [name],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients, ordered by name.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, age, gender
            FROM patients
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

pub(crate) fn ensure_patient_in(
    conn: &Connection,
    name: &str,
    age: u32,
    gender: &str,
) -> DbResult<PatientId> {
    let Some(name) = normalize_patient_name(name) else {
        warn!("Rejected patient with blank name");
        return Err(DbError::Validation("patient name is required".into()));
    };

    let inserted = conn.execute(
        r#"
        INSERT INTO patients (name, age, gender)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(name) DO NOTHING
        "#,
        params![name, age, gender],
    )?;

    let id: PatientId = conn.query_row(
        "SELECT id FROM patients WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;

    if inserted > 0 {
        info!(patient_id = id, "Created patient");
    } else {
        debug!(patient_id = id, "Reusing existing patient");
    }
    Ok(id)
}

pub(crate) fn patient_exists(conn: &Connection, id: PatientId) -> DbResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM patients WHERE id = ?", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
    })
}
