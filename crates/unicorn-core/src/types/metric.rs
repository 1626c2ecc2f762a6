//! Structured aggregation expressions.
//!
//! Every metric evaluates to `(value, sample_size)` over the filtered row
//! set of one entity; `sample_size` is always the row count.

use serde::{Deserialize, Serialize};

use super::filter::Filter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationExpr {
    /// Rows matching every `when` condition (all rows when empty).
    Count {
        #[serde(default)]
        when: Vec<Filter>,
    },
    /// Matching rows divided by all rows.
    Rate { numerator: Vec<Filter> },
    /// Rows matching `numerator` divided by rows matching `denominator`;
    /// null when the denominator is zero.
    Ratio {
        numerator: Vec<Filter>,
        denominator: Vec<Filter>,
    },
    /// Mean of a numeric field, nulls ignored.
    Average { field: String },
    /// Sum of a numeric field, nulls ignored.
    Sum { field: String },
}

impl AggregationExpr {
    pub fn count_all() -> Self {
        Self::Count { when: Vec::new() }
    }

    /// Every field this expression reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Average { field } | Self::Sum { field } => vec![field.as_str()],
            _ => self.filters().into_iter().map(|f| f.field.as_str()).collect(),
        }
    }

    /// Every condition embedded in this expression.
    pub fn filters(&self) -> Vec<&Filter> {
        match self {
            Self::Count { when } => when.iter().collect(),
            Self::Rate { numerator } => numerator.iter().collect(),
            Self::Ratio {
                numerator,
                denominator,
            } => numerator.iter().chain(denominator.iter()).collect(),
            Self::Average { .. } | Self::Sum { .. } => Vec::new(),
        }
    }
}
