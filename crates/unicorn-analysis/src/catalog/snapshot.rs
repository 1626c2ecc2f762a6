use std::sync::Arc;

use rustc_hash::FxHashSet;
use unicorn_core::errors::PatternError;
use unicorn_core::types::PatternTemplate;

use crate::validation::PatternValidator;

/// Immutable result of one catalog load.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    version: u64,
    patterns: Vec<Arc<PatternTemplate>>,
    disabled: Vec<String>,
    rejected: Vec<PatternError>,
    config_errors: Vec<PatternError>,
}

impl CatalogSnapshot {
    pub(crate) fn build(
        version: u64,
        entries: Vec<Result<PatternTemplate, PatternError>>,
        validator: &PatternValidator,
    ) -> Self {
        let mut snapshot = Self {
            version,
            ..Self::default()
        };
        let mut seen = FxHashSet::default();

        for entry in entries {
            let pattern = match entry.and_then(|p| p.check_well_formed().map(|()| p)) {
                Ok(p) => p,
                Err(e) => {
                    snapshot.config_errors.push(e);
                    continue;
                }
            };
            if !seen.insert(pattern.pattern_id.clone()) {
                snapshot.config_errors.push(PatternError::Malformed {
                    pattern_id: pattern.pattern_id.clone(),
                    message: "duplicate pattern_id".to_string(),
                });
                continue;
            }
            if !pattern.enabled {
                snapshot.disabled.push(pattern.pattern_id);
                continue;
            }
            match validator.validate(&pattern) {
                Ok(()) => snapshot.patterns.push(Arc::new(pattern)),
                Err(reason) => snapshot.rejected.push(PatternError::Rejected {
                    pattern_id: pattern.pattern_id,
                    reason,
                }),
            }
        }

        snapshot.patterns.sort_by(|a, b| a.pattern_id.cmp(&b.pattern_id));
        snapshot.disabled.sort();
        snapshot
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Enabled patterns that passed validation, ordered by id.
    pub fn patterns(&self) -> &[Arc<PatternTemplate>] {
        &self.patterns
    }

    pub fn get(&self, pattern_id: &str) -> Option<&Arc<PatternTemplate>> {
        self.patterns
            .binary_search_by(|p| p.pattern_id.as_str().cmp(pattern_id))
            .ok()
            .map(|i| &self.patterns[i])
    }

    pub fn disabled(&self) -> &[String] {
        &self.disabled
    }

    /// Patterns refused by the validator.
    pub fn rejected(&self) -> &[PatternError] {
        &self.rejected
    }

    /// Entries that could not be parsed or are not well formed.
    pub fn config_errors(&self) -> &[PatternError] {
        &self.config_errors
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
