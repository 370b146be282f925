//! Built-in reference table.

use std::collections::HashMap;

use super::{Category, NormalRange, ReferenceCatalog, TestDefinition};

const STANDARD_TESTS: &[(&str, &[(&str, &str, f64, f64)])] = &[
    (
        "Blood Sugar",
        &[
            ("Fasting Glucose", "mg/dL", 70.0, 100.0),
            ("PP Glucose", "mg/dL", 70.0, 140.0),
            ("Random Blood Sugar", "mg/dL", 70.0, 140.0),
            ("HbA1c", "%", 0.0, 5.7),
            ("Average Blood Glucose (ABG)", "mg/dL", 90.0, 120.0),
        ],
    ),
    (
        "Kidney & Metabolic",
        &[
            ("Creatinine", "mg/dL", 0.55, 1.02),
            ("BUN", "mg/dL", 7.94, 20.07),
            ("Urea", "mg/dL", 17.0, 43.0),
            ("Uric Acid", "mg/dL", 3.2, 6.1),
            ("eGFR", "mL/min/1.73 m²", 90.0, 150.0),
            ("BUN / Creatinine Ratio", "Ratio", 9.0, 23.0),
            ("Calcium", "mg/dL", 8.8, 10.6),
        ],
    ),
    (
        "CBC (Hemogram)",
        &[
            ("Hemoglobin", "g/dL", 12.0, 15.0),
            ("WBC (Total Leucocyte Count)", "10³/µL", 4.0, 10.0),
            ("Platelet Count", "10³/µL", 150.0, 410.0),
            ("Hematocrit (PCV)", "%", 36.0, 46.0),
            ("MCV", "fL", 83.0, 101.0),
            ("MCH", "pg", 27.0, 32.0),
            ("MCHC", "g/dL", 31.5, 34.5),
            ("Neutrophils", "%", 40.0, 80.0),
            ("Lymphocytes", "%", 20.0, 40.0),
            ("Monocytes", "%", 2.0, 10.0),
            ("Eosinophils", "%", 1.0, 6.0),
            ("Basophils", "%", 0.0, 2.0),
            ("RDW-CV", "%", 11.6, 14.0),
            ("MPV", "fL", 6.5, 12.0),
        ],
    ),
    (
        "Electrolytes",
        &[
            ("Sodium", "mmol/L", 136.0, 145.0),
            ("Potassium", "mmol/L", 3.5, 5.1),
        ],
    ),
    (
        "Thyroid & Hormones",
        &[
            ("TSH (Ultra-sensitive)", "µIU/mL", 0.54, 5.30),
            ("Total T3", "ng/dL", 80.0, 200.0),
            ("Total T4", "µg/dL", 4.8, 12.7),
            ("Prolactin", "ng/mL", 4.79, 23.3),
            ("Ferritin", "ng/mL", 4.63, 204.0),
        ],
    ),
    (
        "Inflammatory & Special",
        &[("D-Dimer", "µg/mL FEU", 0.0, 1.0)],
    ),
];

/// Build the standard catalog.
///
/// The table above is fixed and checked by the tests below, so the index is
/// built directly rather than through [`ReferenceCatalog::new`].
pub(super) fn standard_catalog() -> ReferenceCatalog {
    let mut categories = Vec::with_capacity(STANDARD_TESTS.len());
    let mut index = HashMap::new();

    for (ci, (label, tests)) in STANDARD_TESTS.iter().enumerate() {
        let mut definitions = Vec::with_capacity(tests.len());
        for (ti, &(name, unit, low, high)) in tests.iter().enumerate() {
            index.entry(name.to_string()).or_insert((ci, ti));
            definitions.push(TestDefinition {
                name: name.to_string(),
                unit: unit.to_string(),
                normal_range: NormalRange::new(low, high),
            });
        }
        categories.push(Category {
            label: label.to_string(),
            tests: definitions,
        });
    }

    ReferenceCatalog { categories, index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    #[test]
    fn test_standard_table_is_valid() {
        let catalog = standard_catalog();
        // Re-validating must succeed: no duplicates, sane ranges
        let validated = ReferenceCatalog::new(catalog.categories().to_vec()).unwrap();
        assert_eq!(validated.len(), 34);
        assert_eq!(catalog.len(), 34);
    }

    #[test]
    fn test_standard_categories() {
        let catalog = standard_catalog();
        let labels: Vec<_> = catalog.categories().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Blood Sugar",
                "Kidney & Metabolic",
                "CBC (Hemogram)",
                "Electrolytes",
                "Thyroid & Hormones",
                "Inflammatory & Special",
            ]
        );
    }

    #[test]
    fn test_standard_lookups() {
        let catalog = standard_catalog();

        assert_eq!(catalog.unit_for("Fasting Glucose"), Some("mg/dL"));
        assert_eq!(catalog.classify("Fasting Glucose", 95.0), Status::Normal);
        assert_eq!(catalog.classify("Fasting Glucose", 130.0), Status::High);
        assert_eq!(catalog.classify("Hemoglobin", 11.2), Status::Low);
        assert_eq!(catalog.classify("D-Dimer", 1.0), Status::Normal);
        assert_eq!(catalog.category_of("Potassium"), Some("Electrolytes"));
    }
}
