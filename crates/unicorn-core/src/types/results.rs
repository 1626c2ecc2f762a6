//! Rows produced by a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pattern::EntityType;

/// Player identifier in the fact store.
pub type EntityId = i64;

/// One entity's aggregate for a pattern. `metric_value` is `None` when the
/// aggregation was undefined (e.g. a ratio with a zero denominator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub entity_id: EntityId,
    pub metric_value: Option<f64>,
    pub sample_size: u32,
}

impl MetricRow {
    pub fn new(entity_id: EntityId, metric_value: f64, sample_size: u32) -> Self {
        Self {
            entity_id,
            metric_value: Some(metric_value),
            sample_size,
        }
    }
}

/// A scored row of one pattern for one run date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub run_date: NaiveDate,
    pub pattern_id: String,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    /// Dense 1..N within the pattern.
    pub rank: u32,
    pub metric_value: f64,
    pub sample_size: u32,
    pub z_raw: f64,
    pub z_adjusted: f64,
    pub score: f64,
}

/// One line of the daily leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntry {
    pub run_date: NaiveDate,
    pub rank: u32,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub pattern_id: String,
    pub metric_value: f64,
    pub sample_size: u32,
    pub score: f64,
    pub description: String,
}

/// Display data for a player, used when rendering descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub entity_id: EntityId,
    pub full_name: String,
    pub team_name: Option<String>,
}
