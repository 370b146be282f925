//! Reference catalog of lab tests, units and normal ranges.
//!
//! The catalog is built once at startup and then shared read-only (usually
//! behind an `Arc`) by the classifier and the history assembler. Test names are
//! unique across all categories; construction fails on a duplicate.

mod standard;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Status;

/// Catalog construction errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Test '{test}' appears in both '{first}' and '{second}'")]
    DuplicateTest {
        test: String,
        first: String,
        second: String,
    },

    #[error("Invalid normal range for '{test}': [{low}, {high}]")]
    InvalidRange { test: String, low: f64, high: f64 },

    #[error("Empty test name in category '{0}'")]
    EmptyTestName(String),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Inclusive `[low, high]` band considered normal for a test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalRange {
    pub low: f64,
    pub high: f64,
}

impl NormalRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Classify a value against this band. Both bounds are inclusive.
    pub fn classify(&self, value: f64) -> Status {
        if value < self.low {
            Status::Low
        } else if value > self.high {
            Status::High
        } else {
            Status::Normal
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.classify(value) == Status::Normal
    }

    fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

/// Unit and normal range for one named test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestDefinition {
    pub name: String,
    pub unit: String,
    pub normal_range: NormalRange,
}

/// A labelled group of tests, e.g. "CBC (Hemogram)".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub label: String,
    pub tests: Vec<TestDefinition>,
}

/// Immutable lookup table: category → test name → unit and range.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    categories: Vec<Category>,
    /// test name → (category index, test index)
    index: HashMap<String, (usize, usize)>,
}

impl ReferenceCatalog {
    /// Build a catalog, rejecting duplicate names and malformed ranges.
    pub fn new(categories: Vec<Category>) -> CatalogResult<Self> {
        let mut index: HashMap<String, (usize, usize)> = HashMap::new();

        for (ci, category) in categories.iter().enumerate() {
            for (ti, test) in category.tests.iter().enumerate() {
                if test.name.trim().is_empty() {
                    return Err(CatalogError::EmptyTestName(category.label.clone()));
                }
                if !test.normal_range.is_valid() {
                    return Err(CatalogError::InvalidRange {
                        test: test.name.clone(),
                        low: test.normal_range.low,
                        high: test.normal_range.high,
                    });
                }
                if let Some(&(prev, _)) = index.get(&test.name) {
                    return Err(CatalogError::DuplicateTest {
                        test: test.name.clone(),
                        first: categories[prev].label.clone(),
                        second: category.label.clone(),
                    });
                }
                index.insert(test.name.clone(), (ci, ti));
            }
        }

        Ok(Self { categories, index })
    }

    /// Start building a catalog test by test.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The built-in catalog shipped with the tracker.
    pub fn standard() -> Self {
        standard::standard_catalog()
    }

    /// Parse a catalog from its JSON form (an array of categories).
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let categories: Vec<Category> = serde_json::from_str(json)?;
        Self::new(categories)
    }

    /// Read and parse a JSON catalog file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the catalog back to JSON.
    pub fn to_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(&self.categories)?)
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by its label.
    pub fn category(&self, label: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.label == label)
    }

    /// Look up a test definition by exact name.
    pub fn definition(&self, test_name: &str) -> Option<&TestDefinition> {
        self.index
            .get(test_name)
            .map(|&(ci, ti)| &self.categories[ci].tests[ti])
    }

    /// Label of the category a test belongs to.
    pub fn category_of(&self, test_name: &str) -> Option<&str> {
        self.index
            .get(test_name)
            .map(|&(ci, _)| self.categories[ci].label.as_str())
    }

    pub fn unit_for(&self, test_name: &str) -> Option<&str> {
        self.definition(test_name).map(|d| d.unit.as_str())
    }

    /// Normal band for a test. `None` means no band should be drawn.
    pub fn range_for(&self, test_name: &str) -> Option<NormalRange> {
        self.definition(test_name).map(|d| d.normal_range)
    }

    /// Classify a value; unknown test names yield [`Status::Unknown`].
    pub fn classify(&self, test_name: &str, value: f64) -> Status {
        match self.range_for(test_name) {
            Some(range) => range.classify(value),
            None => Status::Unknown,
        }
    }

    pub fn contains(&self, test_name: &str) -> bool {
        self.index.contains_key(test_name)
    }

    /// Total number of tests across all categories.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Incremental catalog construction, validated on [`CatalogBuilder::build`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<Category>,
}

impl CatalogBuilder {
    /// Add a test under `category`, creating the category on first use.
    pub fn test(mut self, category: &str, name: &str, unit: &str, low: f64, high: f64) -> Self {
        let definition = TestDefinition {
            name: name.to_string(),
            unit: unit.to_string(),
            normal_range: NormalRange::new(low, high),
        };
        match self.categories.iter_mut().find(|c| c.label == category) {
            Some(existing) => existing.tests.push(definition),
            None => self.categories.push(Category {
                label: category.to_string(),
                tests: vec![definition],
            }),
        }
        self
    }

    pub fn build(self) -> CatalogResult<ReferenceCatalog> {
        ReferenceCatalog::new(self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> ReferenceCatalog {
        ReferenceCatalog::builder()
            .test("Blood Sugar", "Fasting Glucose", "mg/dL", 70.0, 100.0)
            .test("Blood Sugar", "HbA1c", "%", 0.0, 5.7)
            .test("Electrolytes", "Sodium", "mmol/L", 136.0, 145.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_classify_inclusive_bounds() {
        let catalog = small_catalog();

        assert_eq!(catalog.classify("Fasting Glucose", 70.0), Status::Normal);
        assert_eq!(catalog.classify("Fasting Glucose", 100.0), Status::Normal);
        assert_eq!(catalog.classify("Fasting Glucose", 69.99), Status::Low);
        assert_eq!(catalog.classify("Fasting Glucose", 100.01), Status::High);
        assert_eq!(catalog.classify("Sodium", 140.0), Status::Normal);
    }

    #[test]
    fn test_classify_unknown_name() {
        let catalog = small_catalog();
        assert_eq!(catalog.classify("NoSuchTest", 1.0), Status::Unknown);
        // Lookup is exact
        assert_eq!(catalog.classify("fasting glucose", 90.0), Status::Unknown);
    }

    #[test]
    fn test_range_and_unit_lookup() {
        let catalog = small_catalog();

        assert_eq!(
            catalog.range_for("HbA1c"),
            Some(NormalRange::new(0.0, 5.7))
        );
        assert_eq!(catalog.unit_for("Sodium"), Some("mmol/L"));
        assert_eq!(catalog.category_of("Sodium"), Some("Electrolytes"));
        assert!(catalog.range_for("Hemoglobin").is_none());
        assert!(catalog.unit_for("Hemoglobin").is_none());
    }

    #[test]
    fn test_categories_keep_declaration_order() {
        let catalog = small_catalog();
        let labels: Vec<_> = catalog.categories().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Blood Sugar", "Electrolytes"]);

        let sugar = catalog.category("Blood Sugar").unwrap();
        let names: Vec<_> = sugar.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Fasting Glucose", "HbA1c"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_duplicate_test_rejected() {
        let result = ReferenceCatalog::builder()
            .test("Kidney", "Calcium", "mg/dL", 8.8, 10.6)
            .test("Electrolytes", "Calcium", "mg/dL", 8.5, 10.5)
            .build();

        match result {
            Err(CatalogError::DuplicateTest { test, first, second }) => {
                assert_eq!(test, "Calcium");
                assert_eq!(first, "Kidney");
                assert_eq!(second, "Electrolytes");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_range_rejected() {
        let result = ReferenceCatalog::builder()
            .test("Odd", "Backwards", "u", 10.0, 1.0)
            .build();
        assert!(matches!(result, Err(CatalogError::InvalidRange { .. })));

        let result = ReferenceCatalog::builder()
            .test("Odd", "NotANumber", "u", f64::NAN, 1.0)
            .build();
        assert!(matches!(result, Err(CatalogError::InvalidRange { .. })));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = ReferenceCatalog::builder()
            .test("Odd", "  ", "u", 0.0, 1.0)
            .build();
        assert!(matches!(result, Err(CatalogError::EmptyTestName(label)) if label == "Odd"));
    }

    #[test]
    fn test_json_roundtrip() {
        let catalog = small_catalog();
        let json = catalog.to_json().unwrap();
        let parsed = ReferenceCatalog::from_json_str(&json).unwrap();
        assert_eq!(parsed.categories(), catalog.categories());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"label": "Thyroid", "tests": [
                {"name": "TSH", "unit": "uIU/mL", "normal_range": {"low": 0.54, "high": 5.3}}
            ]}
        ]"#;
        let catalog = ReferenceCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.classify("TSH", 6.0), Status::High);

        assert!(matches!(
            ReferenceCatalog::from_json_str("{not json"),
            Err(CatalogError::Json(_))
        ));
    }
}
