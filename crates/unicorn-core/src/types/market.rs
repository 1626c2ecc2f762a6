//! Team market context and per-entity market weights.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::results::EntityId;

pub const MIN_MARKET_WEIGHT: f64 = 0.85;
pub const MAX_MARKET_WEIGHT: f64 = 1.30;
/// Share of a team's market deviation that reaches the score.
pub const MARKET_INFLUENCE: f64 = 0.10;

/// Market context of one team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub team_id: i64,
    pub attendance_score: f64,
    pub media_score: f64,
    /// Always within `[MIN_MARKET_WEIGHT, MAX_MARKET_WEIGHT]`.
    pub market_weight: f64,
    pub market_weight_adj: f64,
}

impl MarketContext {
    /// Derives the market weight from attendance and media scores in `[0, 1]`.
    ///
    /// Non-finite scores are ignored; with no usable score the team is
    /// treated as a neutral market (weight 1.0).
    pub fn from_scores(team_id: i64, attendance_score: f64, media_score: f64) -> Self {
        let usable: Vec<f64> = [attendance_score, media_score]
            .into_iter()
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0))
            .collect();
        let weight = if usable.is_empty() {
            1.0
        } else {
            let blend = usable.iter().sum::<f64>() / usable.len() as f64;
            (MIN_MARKET_WEIGHT + (MAX_MARKET_WEIGHT - MIN_MARKET_WEIGHT) * blend)
                .clamp(MIN_MARKET_WEIGHT, MAX_MARKET_WEIGHT)
        };
        Self {
            team_id,
            attendance_score,
            media_score,
            market_weight: weight,
            market_weight_adj: Self::adjust(weight),
        }
    }

    /// Builds a context from a stored weight, clamping it into range.
    pub fn from_weight(team_id: i64, market_weight: f64) -> Self {
        let weight = if market_weight.is_finite() {
            market_weight.clamp(MIN_MARKET_WEIGHT, MAX_MARKET_WEIGHT)
        } else {
            1.0
        };
        Self {
            team_id,
            attendance_score: f64::NAN,
            media_score: f64::NAN,
            market_weight: weight,
            market_weight_adj: Self::adjust(weight),
        }
    }

    /// `1 + (w - 1) * MARKET_INFLUENCE`.
    pub fn adjust(market_weight: f64) -> f64 {
        1.0 + (market_weight - 1.0) * MARKET_INFLUENCE
    }
}

/// Adjusted market weight per entity. Entities without a team or without
/// market context score with a neutral 1.0.
#[derive(Debug, Clone, Default)]
pub struct MarketWeights {
    by_entity: FxHashMap<EntityId, f64>,
}

impl MarketWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity_id: EntityId, market_weight_adj: f64) {
        self.by_entity.insert(entity_id, market_weight_adj);
    }

    pub fn get(&self, entity_id: EntityId) -> f64 {
        self.by_entity.get(&entity_id).copied().unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }
}

impl FromIterator<(EntityId, f64)> for MarketWeights {
    fn from_iter<I: IntoIterator<Item = (EntityId, f64)>>(iter: I) -> Self {
        Self {
            by_entity: iter.into_iter().collect(),
        }
    }
}
