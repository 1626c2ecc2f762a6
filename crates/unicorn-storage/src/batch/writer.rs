//! Dedicated writer thread fed by a bounded crossbeam channel.
//! Staged rows are buffered and written in batched transactions; a publish
//! swaps a whole run date in one transaction.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::NaiveDate;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rusqlite::{params, Connection, Transaction};
use unicorn_core::errors::StorageError;
use unicorn_core::traits::PublishStats;
use unicorn_core::types::{ScoredResult, TopEntry};

use super::commands::ResultCommand;
use crate::connection::writer::with_immediate_transaction;

const CHANNEL_BOUND: usize = 256;
const BATCH_ROWS: usize = 2_000;
const FLUSH_TIMEOUT: Duration = Duration::from_millis(100);

/// Counters reported when the writer shuts down.
#[derive(Debug, Default, Clone)]
pub struct WriteStats {
    pub staged_patterns: usize,
    pub staged_rows: usize,
    pub publishes: usize,
    pub discards: usize,
    pub flushes: usize,
}

/// Owns the write connection on its own thread.
pub struct ResultWriter {
    tx: Sender<ResultCommand>,
    handle: Option<JoinHandle<WriteStats>>,
}

impl ResultWriter {
    /// Spawn the writer thread. `conn` moves to it.
    pub fn spawn(conn: Connection) -> Result<Self, StorageError> {
        let (tx, rx) = bounded(CHANNEL_BOUND);
        let handle = thread::Builder::new()
            .name("unicorn-result-writer".to_string())
            .spawn(move || writer_loop(conn, rx))
            .map_err(|e| StorageError::Unavailable {
                message: format!("failed to spawn result writer thread: {e}"),
            })?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn send(&self, cmd: ResultCommand) -> Result<(), StorageError> {
        self.tx.send(cmd).map_err(|_| disconnected())
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.send(ResultCommand::Flush)
    }

    /// Stop the thread after draining the channel.
    pub fn shutdown(mut self) -> Result<WriteStats, StorageError> {
        let _ = self.tx.send(ResultCommand::Shutdown);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| StorageError::Unavailable {
                message: "result writer thread panicked".to_string(),
            }),
            None => Ok(WriteStats::default()),
        }
    }
}

impl Drop for ResultWriter {
    fn drop(&mut self) {
        let _ = self.tx.send(ResultCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub(crate) fn disconnected() -> StorageError {
    StorageError::Unavailable {
        message: "result writer channel disconnected".to_string(),
    }
}

struct StagedPattern {
    run_date: NaiveDate,
    pattern_id: String,
    rows: Vec<ScoredResult>,
}

/// Writer state. A failed staging flush poisons the affected date: its
/// next publish reports the error instead of publishing partial results.
struct WriterState {
    conn: Connection,
    buffer: Vec<StagedPattern>,
    buffered_rows: usize,
    failed: Vec<(NaiveDate, String)>,
    stats: WriteStats,
}

fn writer_loop(conn: Connection, rx: Receiver<ResultCommand>) -> WriteStats {
    let mut state = WriterState {
        conn,
        buffer: Vec::new(),
        buffered_rows: 0,
        failed: Vec::new(),
        stats: WriteStats::default(),
    };

    loop {
        match rx.recv_timeout(FLUSH_TIMEOUT) {
            Ok(ResultCommand::StagePattern {
                run_date,
                pattern_id,
                rows,
            }) => {
                state.buffered_rows += rows.len();
                state.buffer.push(StagedPattern {
                    run_date,
                    pattern_id,
                    rows,
                });
                if state.buffered_rows >= BATCH_ROWS {
                    state.flush();
                }
            }
            Ok(ResultCommand::Publish {
                run_date,
                top,
                reply,
            }) => {
                state.flush();
                let _ = reply.send(state.publish(run_date, &top));
            }
            Ok(ResultCommand::Discard { run_date, reply }) => {
                state.flush();
                let _ = reply.send(state.discard(run_date));
            }
            Ok(ResultCommand::Flush) => state.flush(),
            Ok(ResultCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                state.flush();
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if !state.buffer.is_empty() {
                    state.flush();
                }
            }
        }
    }
    state.stats
}

impl WriterState {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.buffer);
        self.buffered_rows = 0;

        let result = with_immediate_transaction(&mut self.conn, |tx| {
            for staged in &batch {
                stage_rows(tx, staged)?;
            }
            Ok(())
        });
        match result {
            Ok(()) => {
                self.stats.flushes += 1;
                self.stats.staged_patterns += batch.len();
                self.stats.staged_rows += batch.iter().map(|s| s.rows.len()).sum::<usize>();
            }
            Err(e) => {
                tracing::error!(error = %e, patterns = batch.len(), "failed to stage results");
                for staged in &batch {
                    if !self.failed.iter().any(|(d, _)| *d == staged.run_date) {
                        self.failed.push((staged.run_date, e.to_string()));
                    }
                }
            }
        }
    }

    fn take_failure(&mut self, run_date: NaiveDate) -> Option<String> {
        let idx = self.failed.iter().position(|(d, _)| *d == run_date)?;
        Some(self.failed.swap_remove(idx).1)
    }

    fn publish(&mut self, run_date: NaiveDate, top: &[TopEntry]) -> Result<PublishStats, StorageError> {
        if let Some(message) = self.take_failure(run_date) {
            let _ = self.discard(run_date);
            return Err(StorageError::SqliteError {
                message: format!("staging failed for {run_date}: {message}"),
            });
        }
        let stats = with_immediate_transaction(&mut self.conn, |tx| publish_date(tx, run_date, top))?;
        self.stats.publishes += 1;
        Ok(stats)
    }

    fn discard(&mut self, run_date: NaiveDate) -> Result<(), StorageError> {
        self.take_failure(run_date);
        self.conn
            .execute(
                "DELETE FROM unicorn_results_staging WHERE run_date = ?1",
                params![run_date],
            )
            .map_err(crate::sqlite_err)?;
        self.stats.discards += 1;
        Ok(())
    }
}

fn stage_rows(tx: &Transaction<'_>, staged: &StagedPattern) -> Result<(), StorageError> {
    // Re-staging a pattern replaces its earlier rows.
    tx.execute(
        "DELETE FROM unicorn_results_staging WHERE run_date = ?1 AND pattern_id = ?2",
        params![staged.run_date, staged.pattern_id],
    )
    .map_err(crate::sqlite_err)?;

    let mut stmt = tx
        .prepare_cached(
            "INSERT INTO unicorn_results_staging
             (run_date, pattern_id, entity_type, entity_id, rank, metric_value,
              sample_size, z_raw, z_adjusted, score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .map_err(crate::sqlite_err)?;
    for row in &staged.rows {
        stmt.execute(params![
            row.run_date,
            row.pattern_id,
            row.entity_type.name(),
            row.entity_id,
            row.rank,
            row.metric_value,
            row.sample_size,
            finite(row.z_raw),
            finite(row.z_adjusted),
            row.score,
        ])
        .map_err(crate::sqlite_err)?;
    }
    Ok(())
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn publish_date(
    tx: &Transaction<'_>,
    run_date: NaiveDate,
    top: &[TopEntry],
) -> Result<PublishStats, StorageError> {
    let mut replaced = tx
        .execute("DELETE FROM unicorn_results WHERE run_date = ?1", params![run_date])
        .map_err(crate::sqlite_err)?;
    replaced += tx
        .execute("DELETE FROM unicorn_top50_daily WHERE run_date = ?1", params![run_date])
        .map_err(crate::sqlite_err)?;

    let results_written = tx
        .execute(
            "INSERT INTO unicorn_results
             (run_date, pattern_id, entity_type, entity_id, rank, metric_value,
              sample_size, z_raw, z_adjusted, score)
             SELECT run_date, pattern_id, entity_type, entity_id, rank, metric_value,
                    sample_size, z_raw, z_adjusted, score
             FROM unicorn_results_staging WHERE run_date = ?1",
            params![run_date],
        )
        .map_err(crate::sqlite_err)?;
    tx.execute(
        "DELETE FROM unicorn_results_staging WHERE run_date = ?1",
        params![run_date],
    )
    .map_err(crate::sqlite_err)?;

    let mut stmt = tx
        .prepare_cached(
            "INSERT INTO unicorn_top50_daily
             (run_date, rank, entity_type, entity_id, pattern_id, metric_value,
              sample_size, score, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(crate::sqlite_err)?;
    for entry in top {
        stmt.execute(params![
            run_date,
            entry.rank,
            entry.entity_type.name(),
            entry.entity_id,
            entry.pattern_id,
            entry.metric_value,
            entry.sample_size,
            entry.score,
            entry.description,
        ])
        .map_err(crate::sqlite_err)?;
    }

    Ok(PublishStats {
        results_written,
        top_written: top.len(),
        rows_replaced: replaced,
    })
}
