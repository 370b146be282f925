//! Patient models.

use serde::{Deserialize, Serialize};

/// Row id of a patient.
pub type PatientId = i64;

/// A tracked family member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    /// Store-assigned identity
    pub id: PatientId,
    /// Name, unique across the store (exact, case-sensitive match)
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Free-form gender label (e.g., "F", "M")
    pub gender: String,
}

impl Patient {
    /// Label used by patient pickers, e.g. `"Asha (34 / F)"`.
    pub fn display_label(&self) -> String {
        format!("{} ({} / {})", self.name, self.age, self.gender)
    }
}

/// Normalize a patient name for storage.
///
/// Returns `None` when the name is empty or whitespace-only.
pub fn normalize_patient_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
