//! Per-date run pipeline.
//!
//! Fan-out: every catalog pattern is built, queried and scored on a rayon
//! pool. Fan-in: successes are staged in pattern-id order, the leaderboard
//! is selected from all of them and the date is published in one go.
//! Per-pattern problems end up in the `RunSummary`; store failures and
//! cancellation abort the run with nothing published.

mod summary;

pub use summary::{PatternFailure, RunSummary};

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use unicorn_core::config::EngineConfig;
use unicorn_core::errors::{PatternError, PipelineError, StorageError, UnicornErrorCode};
use unicorn_core::traits::{Cancellable, CancellationToken, FactStore, ResultSink};
use unicorn_core::types::{EntityId, MarketWeights, PatternTemplate, ScoredResult};

use crate::catalog::PatternCatalog;
use crate::metrics::MetricRegistry;
use crate::query::QueryBuilder;
use crate::scoring::Scorer;
use crate::selection::{self, SelectionLimits};

/// Resolved run knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub limits: SelectionLimits,
    pub min_score_gap: f64,
    pub worker_threads: usize,
    /// `None` disables the per-pattern query timeout.
    pub pattern_timeout: Option<Duration>,
    pub max_rows_per_pattern: u32,
    pub season_year: Option<i32>,
}

impl RunOptions {
    pub fn from_config(engine: &EngineConfig) -> Self {
        let timeout_ms = engine.effective_pattern_timeout_ms();
        Self {
            limits: SelectionLimits {
                target_count: engine.effective_target_count(),
                max_per_pattern: engine.max_per_pattern,
            },
            min_score_gap: engine.effective_min_score_gap(),
            worker_threads: engine.effective_worker_threads(),
            pattern_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            max_rows_per_pattern: engine.effective_max_rows_per_pattern(),
            season_year: engine.season_year,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// What happened to one pattern on a worker.
enum Outcome {
    Scored(Vec<ScoredResult>),
    Failed(PatternError),
    Fatal(StorageError),
    Cancelled,
}

pub struct RunOrchestrator {
    facts: Arc<dyn FactStore>,
    sink: Arc<dyn ResultSink>,
    catalog: Arc<PatternCatalog>,
    builder: QueryBuilder,
    scorer: Scorer,
    options: RunOptions,
    pool: rayon::ThreadPool,
}

impl RunOrchestrator {
    pub fn new(
        facts: Arc<dyn FactStore>,
        sink: Arc<dyn ResultSink>,
        catalog: Arc<PatternCatalog>,
        registry: Arc<MetricRegistry>,
        options: RunOptions,
    ) -> Result<Self, PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.worker_threads.max(1))
            .thread_name(|i| format!("unicorn-worker-{i}"))
            .build()
            .map_err(|e| PipelineError::WorkerPool {
                message: e.to_string(),
            })?;
        Ok(Self {
            facts,
            sink,
            catalog,
            builder: QueryBuilder::new(registry, options.max_rows_per_pattern),
            scorer: Scorer::new(options.min_score_gap),
            options,
            pool,
        })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Evaluate every pattern as of `run_date` and replace the date's
    /// published results and leaderboard.
    pub fn run(
        &self,
        run_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let snapshot = self.catalog.snapshot();
        let mut summary = RunSummary::new(run_date, snapshot.version());
        summary.disabled = snapshot.disabled().len();

        tracing::info!(
            %run_date,
            catalog_version = snapshot.version(),
            patterns = snapshot.patterns().len(),
            workers = self.options.worker_threads,
            "unicorn run started"
        );

        for err in snapshot.rejected() {
            log_pattern_failure(err);
            summary.record_failure(err);
        }
        for err in snapshot.config_errors() {
            log_pattern_failure(err);
            summary.record_failure(err);
        }

        cancel.checkpoint()?;
        // Leftovers of an interrupted run for the same date.
        self.sink.discard(run_date)?;

        let market = self.facts.market_weights(self.options.season_year)?;
        tracing::debug!(entities = market.len(), "market weights loaded");

        let outcomes: Vec<(Arc<PatternTemplate>, Outcome)> = self.pool.install(|| {
            snapshot
                .patterns()
                .par_iter()
                .map(|pattern| {
                    let outcome = self.evaluate(pattern, run_date, &market, cancel);
                    (Arc::clone(pattern), outcome)
                })
                .collect()
        });

        if let Err(err) = self.publish(run_date, outcomes, cancel, &mut summary) {
            tracing::error!(%run_date, code = err.error_code(), error = %err, "unicorn run aborted");
            if let Err(discard_err) = self.sink.discard(run_date) {
                tracing::warn!(%run_date, error = %discard_err, "staged results not discarded");
            }
            return Err(err);
        }

        summary.sort();
        summary.elapsed = started.elapsed();
        tracing::info!(
            %run_date,
            succeeded = summary.succeeded,
            skipped = summary.skipped_count(),
            failed = summary.failed_count(),
            results = summary.results_written,
            top = summary.top_written,
            published = summary.published,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "unicorn run finished"
        );
        Ok(summary)
    }

    fn evaluate(
        &self,
        pattern: &PatternTemplate,
        run_date: NaiveDate,
        market: &MarketWeights,
        cancel: &CancellationToken,
    ) -> Outcome {
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }
        let query = match self.builder.build(pattern, run_date) {
            Ok(query) => query,
            Err(err) => return Outcome::Failed(err),
        };
        let rows = match self.facts.aggregate(&query, self.options.pattern_timeout) {
            Ok(rows) => rows,
            Err(StorageError::QueryTimeout { timeout_ms }) => {
                return Outcome::Failed(PatternError::Timeout {
                    pattern_id: pattern.pattern_id.clone(),
                    timeout_ms,
                })
            }
            Err(StorageError::InvalidQuery { message }) => {
                return Outcome::Failed(PatternError::Malformed {
                    pattern_id: pattern.pattern_id.clone(),
                    message,
                })
            }
            Err(err) => return Outcome::Fatal(err),
        };
        let scored = self.scorer.score(pattern, run_date, &rows, market);
        tracing::debug!(
            pattern_id = %pattern.pattern_id,
            rows = rows.len(),
            scored = scored.len(),
            "pattern evaluated"
        );
        Outcome::Scored(scored)
    }

    /// Fan-in: stage, select, describe, publish.
    fn publish(
        &self,
        run_date: NaiveDate,
        outcomes: Vec<(Arc<PatternTemplate>, Outcome)>,
        cancel: &CancellationToken,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let mut scored: Vec<(Arc<PatternTemplate>, Vec<ScoredResult>)> = Vec::new();
        for (pattern, outcome) in outcomes {
            match outcome {
                Outcome::Scored(results) => scored.push((pattern, results)),
                Outcome::Failed(err) => {
                    log_pattern_failure(&err);
                    summary.record_failure(&err);
                }
                Outcome::Fatal(err) => return Err(err.into()),
                Outcome::Cancelled => return Err(PipelineError::Cancelled),
            }
        }
        cancel.checkpoint()?;
        summary.succeeded = scored.len();

        if scored.is_empty() {
            tracing::warn!(%run_date, "no pattern evaluated successfully, leaving date unchanged");
            return Ok(());
        }

        let mut all_results = Vec::new();
        for (pattern, results) in &scored {
            self.sink
                .stage_pattern(run_date, &pattern.pattern_id, results.clone())?;
            all_results.extend(results.iter().cloned());
        }

        let mut top = selection::select_top(run_date, &all_results, self.options.limits);
        let entity_ids: Vec<EntityId> = top.iter().map(|t| t.entity_id).collect();
        let profiles = self.facts.entity_profiles(&entity_ids)?;
        let templates: FxHashMap<&str, &PatternTemplate> = scored
            .iter()
            .map(|(p, _)| (p.pattern_id.as_str(), p.as_ref()))
            .collect();
        selection::describe(&mut top, &templates, &profiles);

        cancel.checkpoint()?;
        let stats = self.sink.publish(run_date, top)?;
        summary.results_written = stats.results_written;
        summary.top_written = stats.top_written;
        summary.rows_replaced = stats.rows_replaced;
        summary.published = true;
        Ok(())
    }
}

fn log_pattern_failure(err: &PatternError) {
    match err {
        PatternError::Rejected { pattern_id, reason } => tracing::warn!(
            %pattern_id,
            rule = reason.rule(),
            code = err.error_code(),
            %reason,
            "pattern rejected"
        ),
        PatternError::Timeout {
            pattern_id,
            timeout_ms,
        } => tracing::warn!(%pattern_id, timeout_ms, code = err.error_code(), "pattern query timed out"),
        _ => tracing::error!(
            pattern_id = %err.pattern_id(),
            code = err.error_code(),
            error = %err,
            "pattern configuration error"
        ),
    }
}
