//! Per-pattern errors. None of these abort a run.

use std::fmt;

use super::error_code::{self, UnicornErrorCode};
use crate::types::schema::{BaseTable, Concept};

/// Why the validator refused a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("complexity_score {score} exceeds {max}")]
    ComplexityExceeded { score: u32, max: u32 },

    #[error("{count} filter conditions exceed {max}")]
    TooManyConditions { count: usize, max: usize },

    #[error("count_value {value:?} not in allowed set")]
    DisallowedCount { value: String },

    #[error("requires_count set but count_value is missing")]
    MissingRequiredCount,

    #[error("filter on {field} uses disallowed count {value:?}")]
    DisallowedCountFilter { field: String, value: String },

    #[error("filter on {field} references banned concept '{concept}'")]
    BannedConcept { field: String, concept: Concept },

    #[error("home/away context stacked with pitch type and location filters")]
    ContextStacking,
}

impl RejectionReason {
    /// Short stable identifier of the violated rule, used as a log field.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::ComplexityExceeded { .. } | Self::TooManyConditions { .. } => "complexity",
            Self::DisallowedCount { .. }
            | Self::MissingRequiredCount
            | Self::DisallowedCountFilter { .. } => "count_whitelist",
            Self::BannedConcept { .. } | Self::ContextStacking => "banned_concept",
        }
    }
}

/// Errors that make a single pattern unusable for a run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Pattern {pattern_id} rejected: {reason}")]
    Rejected {
        pattern_id: String,
        reason: RejectionReason,
    },

    #[error("Pattern {pattern_id} is malformed: {message}")]
    Malformed { pattern_id: String, message: String },

    #[error("Pattern {pattern_id} references unknown metric '{metric}'")]
    UnknownMetric { pattern_id: String, metric: String },

    #[error("Pattern {pattern_id} references unknown field '{field}' on {table}")]
    UnknownField {
        pattern_id: String,
        field: String,
        table: BaseTable,
    },

    #[error("Pattern {pattern_id} has an invalid filter on {field}: {message}")]
    InvalidFilter {
        pattern_id: String,
        field: String,
        message: String,
    },

    #[error("Pattern {pattern_id} query timed out after {timeout_ms}ms")]
    Timeout { pattern_id: String, timeout_ms: u64 },
}

/// Coarse classification used by the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFailureKind {
    /// Structurally disallowed by the validator.
    Rejected,
    /// References something that does not exist or cannot be typed.
    ConfigError,
    /// Query exceeded its time budget.
    TimedOut,
}

impl PatternFailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::ConfigError => "config_error",
            Self::TimedOut => "timed_out",
        }
    }

    /// Skips are expected outcomes; config errors are catalog defects.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Rejected | Self::TimedOut)
    }
}

impl fmt::Display for PatternFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PatternError {
    pub fn pattern_id(&self) -> &str {
        match self {
            Self::Rejected { pattern_id, .. }
            | Self::Malformed { pattern_id, .. }
            | Self::UnknownMetric { pattern_id, .. }
            | Self::UnknownField { pattern_id, .. }
            | Self::InvalidFilter { pattern_id, .. }
            | Self::Timeout { pattern_id, .. } => pattern_id,
        }
    }

    pub fn kind(&self) -> PatternFailureKind {
        match self {
            Self::Rejected { .. } => PatternFailureKind::Rejected,
            Self::Timeout { .. } => PatternFailureKind::TimedOut,
            Self::Malformed { .. }
            | Self::UnknownMetric { .. }
            | Self::UnknownField { .. }
            | Self::InvalidFilter { .. } => PatternFailureKind::ConfigError,
        }
    }
}

impl UnicornErrorCode for PatternError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => error_code::PATTERN_REJECTED,
            Self::Malformed { .. } => error_code::MALFORMED_PATTERN,
            Self::UnknownMetric { .. } => error_code::UNKNOWN_METRIC,
            Self::UnknownField { .. } => error_code::UNKNOWN_FIELD,
            Self::InvalidFilter { .. } => error_code::INVALID_FILTER,
            Self::Timeout { .. } => error_code::QUERY_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_separate_rejections_from_config_errors() {
        let rejected = PatternError::Rejected {
            pattern_id: "P".into(),
            reason: RejectionReason::ContextStacking,
        };
        let unknown = PatternError::UnknownMetric {
            pattern_id: "P".into(),
            metric: "nope".into(),
        };
        assert_eq!(rejected.kind(), PatternFailureKind::Rejected);
        assert_eq!(unknown.kind(), PatternFailureKind::ConfigError);
        assert_ne!(rejected.error_code(), unknown.error_code());
        assert!(rejected.kind().is_skip());
        assert!(!unknown.kind().is_skip());
    }

    #[test]
    fn test_coded_string() {
        let err = PatternError::Timeout {
            pattern_id: "UNQ-1".into(),
            timeout_ms: 10,
        };
        assert_eq!(
            err.coded_string(),
            "[QUERY_TIMEOUT] Pattern UNQ-1 query timed out after 10ms"
        );
    }
}
