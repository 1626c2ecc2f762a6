//! UnicornRuntime: configuration, database, catalog and run wiring.
//!
//! One runtime serves one process invocation. The database and catalog are
//! opened once; each `run` gets a fresh result sink whose writer thread is
//! drained before the summary is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use unicorn_analysis::{MetricRegistry, PatternCatalog, RunOptions, RunOrchestrator, RunSummary};
use unicorn_core::config::{CliOverrides, UnicornConfig};
use unicorn_core::errors::PipelineError;
use unicorn_core::traits::CancellationToken;
use unicorn_storage::queries::catalog as catalog_queries;
use unicorn_storage::{DatabaseManager, SqliteFactStore, SqliteResultSink};

/// Default database location under the project root.
pub const DEFAULT_DB_DIR: &str = ".unicorn";
pub const DEFAULT_DB_FILE: &str = "unicorn.db";

#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Directory holding `unicorn.toml` and the default database. Default: cwd.
    pub project_root: Option<PathBuf>,
    pub cli: CliOverrides,
}

pub struct UnicornRuntime {
    pub db: Arc<DatabaseManager>,
    pub config: UnicornConfig,
    pub catalog: Arc<PatternCatalog>,
    pub registry: Arc<MetricRegistry>,
    pub project_root: PathBuf,
}

impl UnicornRuntime {
    pub fn new(opts: RuntimeOptions) -> Result<Self, PipelineError> {
        let project_root = opts.project_root.unwrap_or_else(|| PathBuf::from("."));
        let config = UnicornConfig::load(&project_root, Some(&opts.cli))?;

        let db_path = resolve(
            &project_root,
            config.storage.db_path.clone().unwrap_or_else(|| {
                Path::new(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE)
            }),
        );
        let db = Arc::new(DatabaseManager::open(&db_path, &config.storage)?);

        let catalog = Arc::new(open_catalog(&config, &project_root, &db)?);
        let snapshot = catalog.snapshot();
        tracing::info!(
            db = %db_path.display(),
            patterns = snapshot.patterns().len(),
            rejected = snapshot.rejected().len(),
            config_errors = snapshot.config_errors().len(),
            "unicorn runtime ready"
        );

        Ok(Self {
            db,
            config,
            catalog,
            registry: Arc::new(MetricRegistry::builtin()),
            project_root,
        })
    }

    /// Evaluate and publish `run_date`.
    pub fn run(
        &self,
        run_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, PipelineError> {
        let facts = Arc::new(SqliteFactStore::new(Arc::clone(&self.db)));
        let sink = Arc::new(SqliteResultSink::open(&self.db)?);

        let orchestrator = RunOrchestrator::new(
            facts,
            Arc::clone(&sink) as Arc<dyn unicorn_core::traits::ResultSink>,
            Arc::clone(&self.catalog),
            Arc::clone(&self.registry),
            RunOptions::from_config(&self.config.engine),
        )?;
        let result = orchestrator.run(run_date, cancel);
        drop(orchestrator);

        match Arc::try_unwrap(sink) {
            Ok(sink) => {
                let stats = sink.shutdown()?;
                tracing::debug!(
                    staged_rows = stats.staged_rows,
                    publishes = stats.publishes,
                    "result writer drained"
                );
            }
            Err(_) => tracing::warn!("result sink still shared; writer drains on drop"),
        }
        if result.is_ok() {
            self.db.checkpoint()?;
        }
        result
    }
}

fn resolve(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// Catalog file wins over the database table; neither means the seed catalog.
fn open_catalog(
    config: &UnicornConfig,
    root: &Path,
    db: &DatabaseManager,
) -> Result<PatternCatalog, PipelineError> {
    if let Some(path) = &config.catalog.path {
        return Ok(PatternCatalog::load(&resolve(root, path.clone()))?);
    }
    if config.catalog.from_database.unwrap_or(false) {
        let specs = db.with_reader(catalog_queries::load_pattern_specs)?;
        return Ok(PatternCatalog::from_specs(specs));
    }
    Ok(PatternCatalog::seed()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog_run_on_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = UnicornRuntime::new(RuntimeOptions {
            project_root: Some(dir.path().to_path_buf()),
            cli: CliOverrides::default(),
        })
        .unwrap();
        assert!(dir.path().join(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE).exists());
        assert_eq!(runtime.catalog.snapshot().patterns().len(), 20);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let summary = runtime.run(date, &CancellationToken::new()).unwrap();
        assert_eq!(summary.succeeded, 20);
        assert!(summary.failed.is_empty(), "{summary}");
        assert!(summary.published);
        assert_eq!(summary.top_written, 0);
    }

    #[test]
    fn test_catalog_file_from_project_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("patterns.toml"),
            r#"
            [[patterns]]
            pattern_id = "UNQ-ONLY"
            entity_type = "batter"
            base_table = "pitch_facts"
            metric = "count_hr"
            "#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("unicorn.toml"),
            "[catalog]\npath = \"patterns.toml\"\n[engine]\nworker_threads = 2\n",
        )
        .unwrap();

        let runtime = UnicornRuntime::new(RuntimeOptions {
            project_root: Some(dir.path().to_path_buf()),
            cli: CliOverrides::default(),
        })
        .unwrap();
        let snapshot = runtime.catalog.snapshot();
        assert_eq!(snapshot.patterns().len(), 1);
        assert!(snapshot.get("UNQ-ONLY").is_some());
        assert_eq!(runtime.config.engine.worker_threads, Some(2));
    }

    #[test]
    fn test_missing_catalog_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = CliOverrides {
            catalog_path: Some(PathBuf::from("absent.toml")),
            ..CliOverrides::default()
        };
        let err = UnicornRuntime::new(RuntimeOptions {
            project_root: Some(dir.path().to_path_buf()),
            cli,
        })
        .err()
        .unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
