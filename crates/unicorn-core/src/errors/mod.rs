//! Error handling for the unicorn engine.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod pattern_error;
pub mod pipeline_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::UnicornErrorCode;
pub use pattern_error::{PatternError, PatternFailureKind, RejectionReason};
pub use pipeline_error::PipelineError;
pub use storage_error::StorageError;
