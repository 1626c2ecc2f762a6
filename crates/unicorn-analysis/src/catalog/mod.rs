//! Pattern catalog.
//!
//! Patterns are parsed, checked and validated once per load into an
//! immutable `CatalogSnapshot`. Runs hold an `Arc` to the snapshot they
//! started with; `reload` swaps in a fresh one without disturbing them.

mod snapshot;

pub use snapshot::CatalogSnapshot;

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;
use unicorn_core::errors::{ConfigError, PatternError};
use unicorn_core::types::PatternTemplate;

use crate::validation::PatternValidator;

const SEED_CATALOG: &str = include_str!("../../catalog/seed_patterns.toml");

/// Where a catalog's definitions come from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// The built-in seed catalog.
    Seed,
    /// A TOML document held in memory.
    Inline(String),
    /// A TOML file with `[[patterns]]` entries.
    File(PathBuf),
    /// Pre-parsed JSON objects, e.g. rows of the `pattern_templates` table.
    Specs(Vec<JsonValue>),
}

/// A parsed entry, or the error that made it unusable.
type Parsed = Result<PatternTemplate, PatternError>;

pub struct PatternCatalog {
    source: RwLock<CatalogSource>,
    validator: PatternValidator,
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl PatternCatalog {
    /// Catalog from a TOML document. A document that is not TOML at all is
    /// a configuration error; a bad individual entry only excludes itself.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let entries = parse_toml(toml_str, "<inline>")?;
        Ok(Self::with_entries(
            CatalogSource::Inline(toml_str.to_string()),
            entries,
        ))
    }

    /// Catalog from a TOML file; `reload` re-reads the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let entries = read_toml_file(path)?;
        Ok(Self::with_entries(
            CatalogSource::File(path.to_path_buf()),
            entries,
        ))
    }

    /// Catalog from JSON pattern objects.
    pub fn from_specs(specs: Vec<JsonValue>) -> Self {
        let entries = parse_specs(&specs);
        Self::with_entries(CatalogSource::Specs(specs), entries)
    }

    /// The built-in seed catalog.
    pub fn seed() -> Result<Self, ConfigError> {
        let entries = parse_toml(SEED_CATALOG, "<seed>")?;
        Ok(Self::with_entries(CatalogSource::Seed, entries))
    }

    fn with_entries(source: CatalogSource, entries: Vec<Parsed>) -> Self {
        let validator = PatternValidator::new();
        let snapshot = CatalogSnapshot::build(1, entries, &validator);
        Self {
            source: RwLock::new(source),
            validator,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Re-read the catalog's source and swap the snapshot. On error the
    /// previous snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<CatalogSnapshot>, ConfigError> {
        let entries = {
            let source = self.source.read().unwrap_or_else(|e| e.into_inner());
            match &*source {
                CatalogSource::Seed => parse_toml(SEED_CATALOG, "<seed>")?,
                CatalogSource::Inline(doc) => parse_toml(doc, "<inline>")?,
                CatalogSource::File(path) => read_toml_file(path)?,
                CatalogSource::Specs(specs) => parse_specs(specs),
            }
        };
        Ok(self.install(entries))
    }

    /// Replace the catalog's definitions with new JSON objects.
    pub fn reload_specs(&self, specs: Vec<JsonValue>) -> Arc<CatalogSnapshot> {
        let entries = parse_specs(&specs);
        *self.source.write().unwrap_or_else(|e| e.into_inner()) = CatalogSource::Specs(specs);
        self.install(entries)
    }

    fn install(&self, entries: Vec<Parsed>) -> Arc<CatalogSnapshot> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let next = Arc::new(CatalogSnapshot::build(
            current.version() + 1,
            entries,
            &self.validator,
        ));
        tracing::info!(
            version = next.version(),
            patterns = next.patterns().len(),
            rejected = next.rejected().len(),
            config_errors = next.config_errors().len(),
            "pattern catalog reloaded"
        );
        *current = Arc::clone(&next);
        next
    }
}

impl std::fmt::Debug for PatternCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("PatternCatalog")
            .field("version", &snapshot.version())
            .field("patterns", &snapshot.patterns().len())
            .finish()
    }
}

fn read_toml_file(path: &Path) -> Result<Vec<Parsed>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        },
    })?;
    parse_toml(&content, &path.display().to_string())
}

fn parse_toml(toml_str: &str, origin: &str) -> Result<Vec<Parsed>, ConfigError> {
    let parse_error = |message: String| ConfigError::ParseError {
        path: origin.to_string(),
        message,
    };
    let table: toml::Table = toml::from_str(toml_str).map_err(|e| parse_error(e.to_string()))?;
    let entries = match table.get("patterns") {
        None => return Ok(Vec::new()),
        Some(toml::Value::Array(entries)) => entries,
        Some(_) => return Err(parse_error("'patterns' must be an array of tables".to_string())),
    };

    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = entry
                .get("pattern_id")
                .and_then(toml::Value::as_str)
                .map(str::to_string);
            entry
                .clone()
                .try_into::<PatternTemplate>()
                .map_err(|e| malformed(id, index, e.to_string()))
        })
        .collect())
}

fn parse_specs(specs: &[JsonValue]) -> Vec<Parsed> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let id = spec
                .get("pattern_id")
                .and_then(JsonValue::as_str)
                .map(str::to_string);
            serde_json::from_value::<PatternTemplate>(spec.clone())
                .map_err(|e| malformed(id, index, e.to_string()))
        })
        .collect()
}

fn malformed(id: Option<String>, index: usize, message: String) -> PatternError {
    PatternError::Malformed {
        pattern_id: id.unwrap_or_else(|| format!("#{index}")),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unicorn_core::errors::{PatternFailureKind, RejectionReason};

    const TWO_PATTERNS: &str = r#"
        [[patterns]]
        pattern_id = "UNQ-B"
        entity_type = "batter"
        base_table = "pitch_facts"
        metric = "count_hr"

        [[patterns]]
        pattern_id = "UNQ-A"
        entity_type = "pitcher"
        base_table = "pa_facts"
        metric = "xwoba_avg"
        order_direction = "asc"
    "#;

    #[test]
    fn test_seed_catalog_is_fully_valid() {
        let catalog = PatternCatalog::seed().unwrap();
        let snapshot = catalog.snapshot();
        assert!(snapshot.rejected().is_empty(), "{:?}", snapshot.rejected());
        assert!(snapshot.config_errors().is_empty(), "{:?}", snapshot.config_errors());
        assert_eq!(snapshot.patterns().len(), 20);
        assert!(snapshot.get("UNQ-H-0012").is_some());
    }

    #[test]
    fn test_snapshot_is_sorted_by_id() {
        let catalog = PatternCatalog::from_toml_str(TWO_PATTERNS).unwrap();
        let ids: Vec<_> = catalog
            .snapshot()
            .patterns()
            .iter()
            .map(|p| p.pattern_id.clone())
            .collect();
        assert_eq!(ids, vec!["UNQ-A", "UNQ-B"]);
    }

    #[test]
    fn test_invalid_document_is_config_error() {
        assert!(matches!(
            PatternCatalog::from_toml_str("patterns = ["),
            Err(ConfigError::ParseError { .. })
        ));
        assert!(matches!(
            PatternCatalog::from_toml_str("patterns = 3"),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_bad_entries_are_isolated() {
        let catalog = PatternCatalog::from_specs(vec![
            json!({"pattern_id": "UNQ-OK", "entity_type": "batter",
                   "base_table": "pitch_facts", "metric": "count_hr"}),
            json!({"pattern_id": "UNQ-BAD-OP", "entity_type": "batter",
                   "base_table": "pitch_facts", "metric": "count_hr",
                   "filters": [{"field": "vel", "op": "between", "value": 95}]}),
            json!({"pattern_id": "UNQ-INNING", "entity_type": "batter",
                   "base_table": "pitch_facts", "metric": "count_hr",
                   "filters": [{"field": "inning", "op": ">=", "value": 7}]}),
            json!({"pattern_id": "UNQ-OFF", "entity_type": "batter", "enabled": false,
                   "base_table": "pitch_facts", "metric": "count_hr"}),
            json!({"entity_type": "batter"}),
        ]);
        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.patterns().len(), 1);
        assert_eq!(snapshot.disabled(), ["UNQ-OFF".to_string()]);

        assert_eq!(snapshot.rejected().len(), 1);
        assert!(matches!(
            &snapshot.rejected()[0],
            PatternError::Rejected { pattern_id, reason: RejectionReason::BannedConcept { .. } }
                if pattern_id == "UNQ-INNING"
        ));

        let config_ids: Vec<_> = snapshot.config_errors().iter().map(|e| e.pattern_id()).collect();
        assert_eq!(config_ids, vec!["UNQ-BAD-OP", "#4"]);
        assert!(snapshot
            .config_errors()
            .iter()
            .all(|e| e.kind() == PatternFailureKind::ConfigError));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let spec = json!({"pattern_id": "UNQ-DUP", "entity_type": "batter",
                          "base_table": "pitch_facts", "metric": "count_hr"});
        let catalog = PatternCatalog::from_specs(vec![spec.clone(), spec]);
        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.patterns().len(), 1);
        assert_eq!(snapshot.config_errors().len(), 1);
    }

    #[test]
    fn test_reload_swaps_snapshot_without_touching_held_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, TWO_PATTERNS).unwrap();

        let catalog = PatternCatalog::load(&path).unwrap();
        let held = catalog.snapshot();
        assert_eq!(held.version(), 1);

        std::fs::write(
            &path,
            r#"
            [[patterns]]
            pattern_id = "UNQ-C"
            entity_type = "batter"
            base_table = "pitch_facts"
            metric = "hr_rate"
            "#,
        )
        .unwrap();
        let fresh = catalog.reload().unwrap();
        assert_eq!(fresh.version(), 2);
        assert_eq!(fresh.patterns().len(), 1);
        assert_eq!(held.patterns().len(), 2);
        assert_eq!(catalog.snapshot().version(), 2);

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(catalog.reload().is_err());
        assert_eq!(catalog.snapshot().version(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PatternCatalog::load(&dir.path().join("absent.toml")),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_reload_specs() {
        let catalog = PatternCatalog::from_specs(Vec::new());
        assert!(catalog.snapshot().is_empty());
        let next = catalog.reload_specs(vec![json!({"pattern_id": "UNQ-N",
            "entity_type": "batter", "base_table": "pitch_facts", "metric": "count_hr"})]);
        assert_eq!(next.patterns().len(), 1);
        assert_eq!(catalog.reload().unwrap().patterns().len(), 1);
    }
}
