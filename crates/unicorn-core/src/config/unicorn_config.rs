//! Top-level configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{CatalogConfig, EngineConfig, StorageConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "unicorn.toml";

/// Resolution order (highest priority first):
/// 1. CLI flags (`CliOverrides`)
/// 2. Environment variables (`UNICORN_*`)
/// 3. Project config (`unicorn.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UnicornConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub target_count: Option<usize>,
    pub worker_threads: Option<usize>,
    pub season_year: Option<i32>,
}

impl UnicornConfig {
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        tracing::debug!(
            root = %root.display(),
            project_file = project_config_path.exists(),
            cli = cli_overrides.is_some(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Parse a config from a TOML string without applying other layers.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(config: &UnicornConfig) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: &str| ConfigError::ValidationFailed {
            field: field.to_string(),
            message: message.to_string(),
        };
        let engine = &config.engine;
        if engine.target_count == Some(0) {
            return Err(invalid("engine.target_count", "must be greater than 0"));
        }
        if engine.max_per_pattern == Some(0) {
            return Err(invalid("engine.max_per_pattern", "must be greater than 0"));
        }
        if let Some(threads) = engine.worker_threads {
            if !(1..=64).contains(&threads) {
                return Err(invalid("engine.worker_threads", "must be between 1 and 64"));
            }
        }
        if let Some(gap) = engine.min_score_gap {
            if !(0.0..1.0).contains(&gap) {
                return Err(invalid("engine.min_score_gap", "must be in [0.0, 1.0)"));
            }
        }
        if engine.pattern_timeout_ms == Some(0) {
            return Err(invalid("engine.pattern_timeout_ms", "must be greater than 0"));
        }
        if engine.max_rows_per_pattern == Some(0) {
            return Err(invalid("engine.max_rows_per_pattern", "must be greater than 0"));
        }
        if config.storage.read_pool_size == Some(0) {
            return Err(invalid("storage.read_pool_size", "must be greater than 0"));
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config. Unknown keys are ignored.
    fn merge_toml_file(config: &mut UnicornConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let file_config: UnicornConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::merge(config, &file_config);
        Ok(())
    }

    /// `other` wins wherever it has a value.
    fn merge(base: &mut UnicornConfig, other: &UnicornConfig) {
        let (be, oe) = (&mut base.engine, &other.engine);
        if oe.target_count.is_some() {
            be.target_count = oe.target_count;
        }
        if oe.max_per_pattern.is_some() {
            be.max_per_pattern = oe.max_per_pattern;
        }
        if oe.min_score_gap.is_some() {
            be.min_score_gap = oe.min_score_gap;
        }
        if oe.worker_threads.is_some() {
            be.worker_threads = oe.worker_threads;
        }
        if oe.pattern_timeout_ms.is_some() {
            be.pattern_timeout_ms = oe.pattern_timeout_ms;
        }
        if oe.max_rows_per_pattern.is_some() {
            be.max_rows_per_pattern = oe.max_rows_per_pattern;
        }
        if oe.season_year.is_some() {
            be.season_year = oe.season_year;
        }

        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }

        if other.catalog.path.is_some() {
            base.catalog.path = other.catalog.path.clone();
        }
        if other.catalog.from_database.is_some() {
            base.catalog.from_database = other.catalog.from_database;
        }
    }

    /// Pattern: `UNICORN_ENGINE_TARGET_COUNT`, `UNICORN_DB_PATH`, etc.
    /// Unparsable values are ignored.
    fn apply_env_overrides(config: &mut UnicornConfig, var: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|v| v.trim().parse().ok())
        }
        if let Some(v) = parsed(var("UNICORN_ENGINE_TARGET_COUNT")) {
            config.engine.target_count = Some(v);
        }
        if let Some(v) = parsed(var("UNICORN_ENGINE_MAX_PER_PATTERN")) {
            config.engine.max_per_pattern = Some(v);
        }
        if let Some(v) = parsed(var("UNICORN_ENGINE_MIN_SCORE_GAP")) {
            config.engine.min_score_gap = Some(v);
        }
        if let Some(v) = parsed(var("UNICORN_ENGINE_WORKER_THREADS")) {
            config.engine.worker_threads = Some(v);
        }
        if let Some(v) = parsed(var("UNICORN_ENGINE_PATTERN_TIMEOUT_MS")) {
            config.engine.pattern_timeout_ms = Some(v);
        }
        if let Some(v) = parsed(var("UNICORN_ENGINE_SEASON_YEAR")) {
            config.engine.season_year = Some(v);
        }
        if let Some(v) = var("UNICORN_DB_PATH") {
            config.storage.db_path = Some(PathBuf::from(v));
        }
        if let Some(v) = parsed(var("UNICORN_STORAGE_READ_POOL_SIZE")) {
            config.storage.read_pool_size = Some(v);
        }
        if let Some(v) = var("UNICORN_CATALOG_PATH") {
            config.catalog.path = Some(PathBuf::from(v));
        }
    }

    fn apply_cli_overrides(config: &mut UnicornConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.db_path {
            config.storage.db_path = Some(v.clone());
        }
        if let Some(ref v) = cli.catalog_path {
            config.catalog.path = Some(v.clone());
        }
        if let Some(v) = cli.target_count {
            config.engine.target_count = Some(v);
        }
        if let Some(v) = cli.worker_threads {
            config.engine.worker_threads = Some(v);
        }
        if let Some(v) = cli.season_year {
            config.engine.season_year = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UnicornConfig::default();
        assert_eq!(config.engine.effective_target_count(), 50);
        assert_eq!(config.engine.effective_max_rows_per_pattern(), 500);
        assert_eq!(config.engine.effective_min_score_gap(), 0.0);
        assert!(config.engine.max_per_pattern.is_none());
        assert!(UnicornConfig::validate(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let config = UnicornConfig::from_toml("[engine]\ntarget_count = 0\n").unwrap();
        assert!(UnicornConfig::validate(&config).is_err());

        let config = UnicornConfig::from_toml("[engine]\nmin_score_gap = 1.0\n").unwrap();
        assert!(UnicornConfig::validate(&config).is_err());

        let config = UnicornConfig::from_toml("[engine]\nworker_threads = 65\n").unwrap();
        assert!(UnicornConfig::validate(&config).is_err());
    }

    #[test]
    fn test_layer_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[engine]\ntarget_count = 25\nworker_threads = 2\n",
        )
        .unwrap();

        let cli = CliOverrides {
            worker_threads: Some(8),
            ..Default::default()
        };
        let config = UnicornConfig::load(dir.path(), Some(&cli)).unwrap();
        assert_eq!(config.engine.target_count, Some(25));
        assert_eq!(config.engine.worker_threads, Some(8));
    }

    #[test]
    fn test_env_layer_overrides_file_values() {
        let mut config = UnicornConfig::from_toml("[engine]\ntarget_count = 25\n").unwrap();
        UnicornConfig::apply_env_overrides(&mut config, |key| match key {
            "UNICORN_ENGINE_TARGET_COUNT" => Some("10".to_string()),
            "UNICORN_ENGINE_WORKER_THREADS" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.engine.target_count, Some(10));
        assert_eq!(config.engine.worker_threads, None);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[engine\n").unwrap();
        let err = UnicornConfig::load(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
