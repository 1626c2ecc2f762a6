//! Run-fatal errors.

use super::error_code::{self, UnicornErrorCode};
use super::{ConfigError, StorageError};

/// Errors that abort a whole run. Nothing is published for the run date
/// when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    #[error("Run cancelled")]
    Cancelled,
}

impl UnicornErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::WorkerPool { .. } => error_code::WORKER_POOL_ERROR,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
