//! SQLite-backed `ResultSink`.

use chrono::NaiveDate;
use crossbeam_channel::bounded;
use unicorn_core::errors::StorageError;
use unicorn_core::traits::{PublishStats, ResultSink};
use unicorn_core::types::{ScoredResult, TopEntry};

use crate::batch::writer::disconnected;
use crate::batch::{ResultCommand, ResultWriter, WriteStats};
use crate::connection::DatabaseManager;

/// Stages pattern results and publishes run dates through the writer thread.
pub struct SqliteResultSink {
    writer: ResultWriter,
}

impl SqliteResultSink {
    pub fn open(db: &DatabaseManager) -> Result<Self, StorageError> {
        let conn = db.open_writer_connection()?;
        Ok(Self {
            writer: ResultWriter::spawn(conn)?,
        })
    }

    pub fn shutdown(self) -> Result<WriteStats, StorageError> {
        self.writer.shutdown()
    }
}

impl ResultSink for SqliteResultSink {
    fn stage_pattern(
        &self,
        run_date: NaiveDate,
        pattern_id: &str,
        results: Vec<ScoredResult>,
    ) -> Result<(), StorageError> {
        self.writer.send(ResultCommand::StagePattern {
            run_date,
            pattern_id: pattern_id.to_string(),
            rows: results,
        })
    }

    fn publish(&self, run_date: NaiveDate, top: Vec<TopEntry>) -> Result<PublishStats, StorageError> {
        let (reply, rx) = bounded(1);
        self.writer.send(ResultCommand::Publish {
            run_date,
            top,
            reply,
        })?;
        rx.recv().map_err(|_| disconnected())?
    }

    fn discard(&self, run_date: NaiveDate) -> Result<(), StorageError> {
        let (reply, rx) = bounded(1);
        self.writer.send(ResultCommand::Discard { run_date, reply })?;
        rx.recv().map_err(|_| disconnected())?
    }
}
