//! Classification of measured values against the reference catalog.

use std::sync::Arc;

use crate::catalog::ReferenceCatalog;
use crate::models::Status;

/// Unit and status frozen onto a result at insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Catalog unit, or empty when the test is not catalogued
    pub unit: String,
    pub status: Status,
}

/// Maps `(test name, value)` pairs to a [`Status`].
#[derive(Debug, Clone)]
pub struct Classifier {
    catalog: Arc<ReferenceCatalog>,
}

impl Classifier {
    pub fn new(catalog: Arc<ReferenceCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn classify(&self, test_name: &str, value: f64) -> Status {
        self.catalog.classify(test_name, value)
    }

    /// Snapshot the catalog unit and the status for a new result.
    pub fn snapshot(&self, test_name: &str, value: f64) -> Classification {
        Classification {
            unit: self.catalog.unit_for(test_name).unwrap_or_default().to_string(),
            status: self.classify(test_name, value),
        }
    }
}
