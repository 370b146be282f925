//! Runtime configuration.
//!
//! Values come from the environment, falling back to defaults:
//!
//! - `HEALTH_TRACKER_DB_PATH`: SQLite file (default `health_tracker.db`)
//! - `HEALTH_TRACKER_CATALOG`: JSON catalog file (default: built-in catalog)
//! - `HEALTH_TRACKER_CONTEXT_REPORTS`: reports included in a health context

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::catalog::{CatalogResult, ReferenceCatalog};
use crate::history::DEFAULT_CONTEXT_REPORTS;

pub const DB_PATH_VAR: &str = "HEALTH_TRACKER_DB_PATH";
pub const CATALOG_VAR: &str = "HEALTH_TRACKER_CATALOG";
pub const CONTEXT_REPORTS_VAR: &str = "HEALTH_TRACKER_CONTEXT_REPORTS";

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Tracker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Optional JSON catalog replacing the built-in one
    pub catalog_path: Option<PathBuf>,
    /// Number of recent reports in a health context
    pub context_report_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("health_tracker.db"),
            catalog_path: None,
            context_report_limit: DEFAULT_CONTEXT_REPORTS,
        }
    }
}

impl TrackerConfig {
    /// Build configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_path = lookup(DB_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let catalog_path = lookup(CATALOG_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let context_report_limit = match lookup(CONTEXT_REPORTS_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: CONTEXT_REPORTS_VAR,
                        value: raw,
                    })
                }
            },
            None => defaults.context_report_limit,
        };

        info!(
            "Tracker configuration: database={}, catalog={}, context_reports={}",
            database_path.display(),
            catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            context_report_limit
        );

        Ok(Self {
            database_path,
            catalog_path,
            context_report_limit,
        })
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> CatalogResult<ReferenceCatalog> {
        match &self.catalog_path {
            Some(path) => ReferenceCatalog::from_json_file(path),
            None => Ok(ReferenceCatalog::standard()),
        }
    }
}
