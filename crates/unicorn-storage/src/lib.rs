//! # unicorn-storage
//!
//! SQLite persistence for the unicorn engine.
//! WAL mode, write-serialized + read-pooled, a dedicated result writer
//! thread, versioned migrations, and the SQL rendering of metric queries.

pub mod batch;
pub mod connection;
pub mod fact_store;
pub mod migrations;
pub mod queries;
pub mod sink;
pub mod sql;

pub use batch::ResultWriter;
pub use connection::DatabaseManager;
pub use fact_store::SqliteFactStore;
pub use sink::SqliteResultSink;

use unicorn_core::errors::StorageError;

/// Map any displayable driver error into `StorageError::SqliteError`.
pub(crate) fn sqlite_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
