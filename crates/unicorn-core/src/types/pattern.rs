//! Pattern templates: immutable rule definitions read from the catalog.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::filter::Filter;
use super::metric::AggregationExpr;
use super::schema::BaseTable;
use crate::errors::PatternError;

/// Kind of entity a pattern ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Batter,
    Pitcher,
}

impl EntityType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Batter => "batter",
            Self::Pitcher => "pitcher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batter" => Some(Self::Batter),
            "pitcher" => Some(Self::Pitcher),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether higher or lower metric values are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

impl OrderDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Orders two metric values so the better one comes first.
    pub fn better_first(&self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Desc => b.total_cmp(&a),
            Self::Asc => a.total_cmp(&b),
        }
    }
}

/// Category prefixes whose patterns default to the boosted public weight.
const BOOSTED_CATEGORIES: &[&str] = &["A_BARRELS", "COUNT", "STARTER", "RELIEVER", "FATIGUE", "PARK"];

/// A declarative rule definition. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternTemplate {
    pub pattern_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description_template: String,
    pub entity_type: EntityType,
    pub base_table: BaseTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_direction: OrderDirection,
    pub metric: String,
    /// Structured override; when set the metric registry is bypassed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_expr: Option<AggregationExpr>,
    #[serde(default)]
    pub target_sample: u32,
    #[serde(default = "default_min_sample")]
    pub min_sample: u32,
    #[serde(default = "default_weight")]
    pub unicorn_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<u32>,
    #[serde(default)]
    pub requires_count: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_value: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_min_sample() -> u32 {
    10
}

fn default_weight() -> f64 {
    1.0
}

impl PatternTemplate {
    /// Declared complexity, or the number of filter conditions when absent.
    pub fn effective_complexity(&self) -> u32 {
        self.complexity_score
            .unwrap_or_else(|| u32::try_from(self.filters.len()).unwrap_or(u32::MAX))
    }

    /// Public-appeal weight, falling back to the category default.
    pub fn public_weight_or_default(&self) -> f64 {
        if let Some(w) = self.public_weight {
            return w;
        }
        match self.category.as_deref() {
            None => 1.0,
            Some(cat) if BOOSTED_CATEGORIES.iter().any(|p| cat.starts_with(p)) => 1.2,
            Some(cat) if cat.starts_with("B_DIRECTION") => 1.0,
            Some(_) => 0.8,
        }
    }

    /// Structural checks that do not depend on validator policy.
    pub fn check_well_formed(&self) -> Result<(), PatternError> {
        let malformed = |message: String| PatternError::Malformed {
            pattern_id: self.pattern_id.clone(),
            message,
        };
        if self.pattern_id.trim().is_empty() {
            return Err(malformed("pattern_id is empty".to_string()));
        }
        if self.metric.trim().is_empty() && self.metric_expr.is_none() {
            return Err(malformed("metric is empty".to_string()));
        }
        if !(self.unicorn_weight.is_finite() && self.unicorn_weight > 0.0) {
            return Err(malformed(format!(
                "unicorn_weight must be positive, got {}",
                self.unicorn_weight
            )));
        }
        let public = self.public_weight_or_default();
        if !(public.is_finite() && public > 0.0) {
            return Err(malformed(format!("public_weight must be positive, got {public}")));
        }
        Ok(())
    }
}
