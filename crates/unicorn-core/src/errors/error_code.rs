//! UnicornErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this so logs and run summaries can carry
/// a stable code string next to the human-readable message.
pub trait UnicornErrorCode {
    /// Returns the error code string (e.g., "UNKNOWN_METRIC").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const QUERY_TIMEOUT: &str = "QUERY_TIMEOUT";
pub const PATTERN_REJECTED: &str = "PATTERN_REJECTED";
pub const UNKNOWN_METRIC: &str = "UNKNOWN_METRIC";
pub const UNKNOWN_FIELD: &str = "UNKNOWN_FIELD";
pub const INVALID_FILTER: &str = "INVALID_FILTER";
pub const MALFORMED_PATTERN: &str = "MALFORMED_PATTERN";
pub const CANCELLED: &str = "CANCELLED";
pub const WORKER_POOL_ERROR: &str = "WORKER_POOL_ERROR";
