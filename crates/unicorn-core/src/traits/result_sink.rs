//! Write side of the engine: the result sink.

use chrono::NaiveDate;

use crate::errors::StorageError;
use crate::types::{ScoredResult, TopEntry};

/// Row counts written by a publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub results_written: usize,
    pub top_written: usize,
    /// Rows of an earlier run for the same date that were replaced.
    pub rows_replaced: usize,
}

/// Durable storage for a run date's results.
///
/// Staged rows stay invisible until `publish`, which replaces everything
/// stored for the date in one transaction. `discard` drops staged rows and
/// leaves published state untouched.
pub trait ResultSink: Send + Sync {
    fn stage_pattern(
        &self,
        run_date: NaiveDate,
        pattern_id: &str,
        results: Vec<ScoredResult>,
    ) -> Result<(), StorageError>;

    fn publish(&self, run_date: NaiveDate, top: Vec<TopEntry>) -> Result<PublishStats, StorageError>;

    fn discard(&self, run_date: NaiveDate) -> Result<(), StorageError>;
}
