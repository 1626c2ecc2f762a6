//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use unicorn_core::config::StorageConfig;
use unicorn_core::errors::StorageError;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::migrations;

/// Owns the serialized write connection and the read pool of one database.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: ReadPool,
    path: PathBuf,
    busy_timeout_ms: u64,
}

impl DatabaseManager {
    /// Open (creating if needed) the database, apply pragmas and run migrations.
    pub fn open(path: &Path, config: &StorageConfig) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Unavailable {
                message: format!("create {}: {e}", parent.display()),
            })?;
        }
        let busy_timeout_ms = config.effective_busy_timeout_ms();

        let writer = Connection::open(path).map_err(|e| StorageError::Unavailable {
            message: format!("open {}: {e}", path.display()),
        })?;
        apply_pragmas(&writer, busy_timeout_ms)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, config.effective_read_pool_size(), busy_timeout_ms)?;
        tracing::debug!(path = %path.display(), readers = readers.size(), "database opened");

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: path.to_path_buf(),
            busy_timeout_ms,
        })
    }

    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError>,
    {
        let mut guard = self.writer.lock().map_err(|_| StorageError::Unavailable {
            message: "write lock poisoned".to_string(),
        })?;
        f(&mut guard)
    }

    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.readers.with_conn(f)
    }

    pub fn read_pool_size(&self) -> usize {
        self.readers.size()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh write connection for the result writer thread.
    pub fn open_writer_connection(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path).map_err(|e| StorageError::Unavailable {
            message: format!("open writer connection: {e}"),
        })?;
        apply_pragmas(&conn, self.busy_timeout_ms)?;
        Ok(conn)
    }

    /// WAL checkpoint (TRUNCATE) after a run was published.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(crate::sqlite_err)
        })
    }
}
