//! Run engine configuration.

use serde::{Deserialize, Serialize};

/// Knobs of a single run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Leaderboard length. Default: 50.
    pub target_count: Option<usize>,
    /// Leaderboard entries allowed from one pattern. Default: unlimited.
    pub max_per_pattern: Option<usize>,
    /// Relative score spacing inside a pattern's ranking. Default: 0.0 (off).
    pub min_score_gap: Option<f64>,
    /// Worker pool size for pattern evaluation. Default: 4.
    pub worker_threads: Option<usize>,
    /// Per-pattern query budget in milliseconds. Default: 30000.
    pub pattern_timeout_ms: Option<u64>,
    /// Row bound of each pattern query. Default: 500.
    pub max_rows_per_pattern: Option<u32>,
    /// Restrict market context to one season. Default: any season.
    pub season_year: Option<i32>,
}

impl EngineConfig {
    pub fn effective_target_count(&self) -> usize {
        self.target_count.unwrap_or(50)
    }

    pub fn effective_min_score_gap(&self) -> f64 {
        self.min_score_gap.unwrap_or(0.0)
    }

    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or(4)
    }

    pub fn effective_pattern_timeout_ms(&self) -> u64 {
        self.pattern_timeout_ms.unwrap_or(30_000)
    }

    pub fn effective_max_rows_per_pattern(&self) -> u32 {
        self.max_rows_per_pattern.unwrap_or(500)
    }
}
