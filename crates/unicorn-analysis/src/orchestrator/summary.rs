//! Outcome of one run.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use unicorn_core::errors::{PatternError, PatternFailureKind, UnicornErrorCode};

/// A pattern that produced no results for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub pattern_id: String,
    pub kind: PatternFailureKind,
    pub code: &'static str,
    pub message: String,
}

impl From<&PatternError> for PatternFailure {
    fn from(err: &PatternError) -> Self {
        Self {
            pattern_id: err.pattern_id().to_string(),
            kind: err.kind(),
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub catalog_version: u64,
    /// Patterns evaluated to a (possibly empty) result list.
    pub succeeded: usize,
    /// Rejected by validation or timed out.
    pub skipped: Vec<PatternFailure>,
    /// Configuration errors.
    pub failed: Vec<PatternFailure>,
    pub disabled: usize,
    pub results_written: usize,
    pub top_written: usize,
    pub rows_replaced: usize,
    /// False when nothing was evaluated successfully and the date was left
    /// as it was.
    pub published: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub(crate) fn new(run_date: NaiveDate, catalog_version: u64) -> Self {
        Self {
            run_date,
            catalog_version,
            succeeded: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
            disabled: 0,
            results_written: 0,
            top_written: 0,
            rows_replaced: 0,
            published: false,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn record_failure(&mut self, err: &PatternError) {
        let failure = PatternFailure::from(err);
        if failure.kind.is_skip() {
            self.skipped.push(failure);
        } else {
            self.failed.push(failure);
        }
    }

    pub(crate) fn sort(&mut self) {
        self.skipped.sort_by(|a, b| a.pattern_id.cmp(&b.pattern_id));
        self.failed.sort_by(|a, b| a.pattern_id.cmp(&b.pattern_id));
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "run {}: {} succeeded, {} skipped, {} failed, {} disabled",
            self.run_date,
            self.succeeded,
            self.skipped.len(),
            self.failed.len(),
            self.disabled
        )?;
        if self.published {
            writeln!(
                f,
                "published {} results and {} leaderboard entries ({} replaced) in {} ms",
                self.results_written,
                self.top_written,
                self.rows_replaced,
                self.elapsed.as_millis()
            )?;
        } else {
            writeln!(f, "nothing published")?;
        }
        for failure in self.skipped.iter().chain(&self.failed) {
            writeln!(f, "  {} {}: {}", failure.kind, failure.pattern_id, failure.message)?;
        }
        Ok(())
    }
}
