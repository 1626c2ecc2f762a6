#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use unicorn_analysis::{MetricRegistry, PatternCatalog, RunOptions, RunOrchestrator};
use unicorn_core::errors::StorageError;
use unicorn_core::traits::{FactStore, PublishStats, ResultSink};
use unicorn_core::types::{
    EntityId, EntityProfile, MarketWeights, MetricQuery, MetricRow, ScoredResult, TopEntry,
};

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// Canned per-pattern rows.
#[derive(Default)]
pub struct MemoryFacts {
    rows: FxHashMap<String, Vec<MetricRow>>,
    timeouts: Vec<String>,
    pub market: MarketWeights,
    pub profiles: FxHashMap<EntityId, EntityProfile>,
    unavailable: AtomicBool,
    pub queries: Mutex<Vec<MetricQuery>>,
}

impl MemoryFacts {
    pub fn with_rows(mut self, pattern_id: &str, rows: Vec<MetricRow>) -> Self {
        self.rows.insert(pattern_id.to_string(), rows);
        self
    }

    pub fn timing_out(mut self, pattern_id: &str) -> Self {
        self.timeouts.push(pattern_id.to_string());
        self
    }

    pub fn with_profile(mut self, entity_id: EntityId, name: &str, team: &str) -> Self {
        self.profiles.insert(
            entity_id,
            EntityProfile {
                entity_id,
                full_name: name.to_string(),
                team_name: Some(team.to_string()),
            },
        );
        self
    }

    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "fact store offline".to_string(),
            });
        }
        Ok(())
    }
}

impl FactStore for MemoryFacts {
    fn aggregate(
        &self,
        query: &MetricQuery,
        _timeout: Option<Duration>,
    ) -> Result<Vec<MetricRow>, StorageError> {
        self.check()?;
        self.queries.lock().unwrap().push(query.clone());
        if self.timeouts.contains(&query.pattern_id) {
            return Err(StorageError::QueryTimeout { timeout_ms: 5 });
        }
        Ok(self.rows.get(&query.pattern_id).cloned().unwrap_or_default())
    }

    fn market_weights(&self, _season_year: Option<i32>) -> Result<MarketWeights, StorageError> {
        self.check()?;
        Ok(self.market.clone())
    }

    fn entity_profiles(
        &self,
        entity_ids: &[EntityId],
    ) -> Result<FxHashMap<EntityId, EntityProfile>, StorageError> {
        self.check()?;
        Ok(entity_ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Published {
    pub results: Vec<ScoredResult>,
    pub top: Vec<TopEntry>,
}

/// Staging + publish semantics of the SQLite sink, in memory.
#[derive(Default)]
pub struct MemorySink {
    staged: Mutex<FxHashMap<NaiveDate, Vec<ScoredResult>>>,
    pub published: Mutex<FxHashMap<NaiveDate, Published>>,
}

impl MemorySink {
    pub fn published(&self, run_date: NaiveDate) -> Option<Published> {
        self.published.lock().unwrap().get(&run_date).cloned()
    }

    pub fn staged_len(&self, run_date: NaiveDate) -> usize {
        self.staged.lock().unwrap().get(&run_date).map_or(0, Vec::len)
    }
}

impl ResultSink for MemorySink {
    fn stage_pattern(
        &self,
        run_date: NaiveDate,
        _pattern_id: &str,
        results: Vec<ScoredResult>,
    ) -> Result<(), StorageError> {
        self.staged.lock().unwrap().entry(run_date).or_default().extend(results);
        Ok(())
    }

    fn publish(&self, run_date: NaiveDate, top: Vec<TopEntry>) -> Result<PublishStats, StorageError> {
        let results = self.staged.lock().unwrap().remove(&run_date).unwrap_or_default();
        let stats = PublishStats {
            results_written: results.len(),
            top_written: top.len(),
            rows_replaced: self
                .published(run_date)
                .map_or(0, |p| p.results.len() + p.top.len()),
        };
        self.published
            .lock()
            .unwrap()
            .insert(run_date, Published { results, top });
        Ok(stats)
    }

    fn discard(&self, run_date: NaiveDate) -> Result<(), StorageError> {
        self.staged.lock().unwrap().remove(&run_date);
        Ok(())
    }
}

/// One `[[patterns]]` entry over pitch facts.
pub fn pattern_toml(pattern_id: &str, metric: &str, extra: &str) -> String {
    format!(
        r#"
[[patterns]]
pattern_id = "{pattern_id}"
description_template = "{{{{player_name}}}} of {{{{team_name}}}}: {{{{metric_value}}}}"
entity_type = "batter"
base_table = "pitch_facts"
metric = "{metric}"
min_sample = 1
{extra}
"#
    )
}

pub fn orchestrator(
    facts: Arc<MemoryFacts>,
    sink: Arc<MemorySink>,
    catalog_toml: &str,
) -> RunOrchestrator {
    let catalog = PatternCatalog::from_toml_str(catalog_toml).unwrap();
    let options = RunOptions {
        worker_threads: 2,
        ..RunOptions::default()
    };
    RunOrchestrator::new(
        facts,
        sink,
        Arc::new(catalog),
        Arc::new(MetricRegistry::builtin()),
        options,
    )
    .unwrap()
}
