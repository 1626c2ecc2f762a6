//! Commands accepted by the result writer thread.

use chrono::NaiveDate;
use crossbeam_channel::Sender;
use unicorn_core::errors::StorageError;
use unicorn_core::traits::PublishStats;
use unicorn_core::types::{ScoredResult, TopEntry};

/// A command sent to the result writer thread.
#[derive(Debug)]
pub enum ResultCommand {
    /// Buffer one pattern's scored rows for the staging area.
    StagePattern {
        run_date: NaiveDate,
        pattern_id: String,
        rows: Vec<ScoredResult>,
    },
    /// Replace the published state of a date with its staged rows and the
    /// given leaderboard, atomically.
    Publish {
        run_date: NaiveDate,
        top: Vec<TopEntry>,
        reply: Sender<Result<PublishStats, StorageError>>,
    },
    /// Drop staged rows of a date.
    Discard {
        run_date: NaiveDate,
        reply: Sender<Result<(), StorageError>>,
    },
    /// Write buffered rows now.
    Flush,
    /// Shut down the writer thread.
    Shutdown,
}
