//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading rule
//! thresholds and ingestion settings from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{IngestionSettings, RuleThresholds};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── thresholds.yaml   # Labour-law caps
/// └── ingestion.yaml    # Date formats, recognition deadline
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_compliance::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Weekly cap: {}h", loader.thresholds().max_weekly_hours);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    thresholds: RuleThresholds,
    ingestion: IngestionSettings,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Either file is missing (`ConfigNotFound`)
    /// - Either file contains invalid YAML (`ConfigParseError`)
    /// - The thresholds fail validation (`InvalidThresholds`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let thresholds = Self::load_yaml::<RuleThresholds>(&path.join("thresholds.yaml"))?;
        thresholds.validate()?;

        let ingestion = Self::load_yaml::<IngestionSettings>(&path.join("ingestion.yaml"))?;

        debug!(
            path = %path.display(),
            date_formats = ingestion.date_formats.len(),
            "Loaded configuration"
        );

        Ok(Self {
            thresholds,
            ingestion,
        })
    }

    /// Builds a loader from values already in memory.
    pub fn from_parts(thresholds: RuleThresholds, ingestion: IngestionSettings) -> Self {
        Self {
            thresholds,
            ingestion,
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the rule thresholds read at load time.
    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Returns the ingestion settings.
    pub fn ingestion(&self) -> &IngestionSettings {
        &self.ingestion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shift-compliance-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_shipped_defaults() {
        let loader = ConfigLoader::load("./config/default").unwrap();
        assert_eq!(loader.thresholds(), &RuleThresholds::default());
        assert_eq!(loader.ingestion(), &IngestionSettings::default());
    }

    #[test]
    fn test_missing_directory_is_config_not_found() {
        let result = ConfigLoader::load("./config/does-not-exist");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.ends_with("thresholds.yaml"))
            }
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = scratch_dir();
        fs::write(dir.join("thresholds.yaml"), "max_daily_hours: [not, a, number").unwrap();
        fs::write(dir.join("ingestion.yaml"), "day_first: true\n").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_partial_files_override_only_named_fields() {
        let dir = scratch_dir();
        fs::write(dir.join("thresholds.yaml"), "max_weekly_hours: \"46\"\n").unwrap();
        fs::write(dir.join("ingestion.yaml"), "recognition_deadline_ms: 500\n").unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.thresholds().max_weekly_hours, Decimal::new(46, 0));
        assert_eq!(loader.thresholds().max_daily_hours, Decimal::new(10, 0));
        assert_eq!(loader.ingestion().recognition_deadline_ms, 500);
        assert!(loader.ingestion().day_first);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_inconsistent_thresholds_rejected_at_load() {
        let dir = scratch_dir();
        fs::write(dir.join("thresholds.yaml"), "max_daily_hours: \"-1\"\n").unwrap();
        fs::write(dir.join("ingestion.yaml"), "{}\n").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::InvalidThresholds { .. })));

        fs::remove_dir_all(dir).ok();
    }
}
