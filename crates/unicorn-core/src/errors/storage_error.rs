//! Storage errors for the fact store and the result sink.

use super::error_code::{self, UnicornErrorCode};

/// Errors raised by storage collaborators.
///
/// `QueryTimeout` and `InvalidQuery` are scoped to a single pattern;
/// every other variant means the store itself cannot be trusted for
/// the rest of the run.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Migration to v{version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Query exceeded {timeout_ms}ms timeout")]
    QueryTimeout { timeout_ms: u64 },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },
}

impl StorageError {
    /// Whether the failure affects only the query that raised it.
    pub fn is_query_scoped(&self) -> bool {
        matches!(self, Self::QueryTimeout { .. } | Self::InvalidQuery { .. })
    }
}

impl UnicornErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SqliteError { .. } | Self::InvalidQuery { .. } => error_code::STORAGE_ERROR,
            Self::Unavailable { .. } => error_code::STORE_UNAVAILABLE,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::QueryTimeout { .. } => error_code::QUERY_TIMEOUT,
        }
    }
}
