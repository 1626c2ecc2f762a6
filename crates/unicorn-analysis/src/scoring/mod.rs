//! Per-pattern scoring.
//!
//! z-score against the pattern's own result set (rank fallback for
//! degenerate sets), dampened by sample size, then scaled by the pattern,
//! public-appeal and market weights.

pub mod spacing;
pub mod stats;

pub use spacing::apply_min_score_spacing;
pub use stats::{rank_based_z, sample_weight, summarize, Summary};

use std::cmp::Ordering;

use chrono::NaiveDate;
use unicorn_core::types::{
    EntityId, MarketWeights, MetricRow, OrderDirection, PatternTemplate, ScoredResult,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    min_score_gap: f64,
}

struct Clean {
    entity_id: EntityId,
    value: f64,
    sample_size: u32,
}

impl Scorer {
    pub fn new(min_score_gap: f64) -> Self {
        Self { min_score_gap }
    }

    /// Score one pattern's rows. The output is in rank order with ranks
    /// `1..=n`; empty or all-null input yields an empty list.
    pub fn score(
        &self,
        pattern: &PatternTemplate,
        run_date: NaiveDate,
        rows: &[MetricRow],
        market: &MarketWeights,
    ) -> Vec<ScoredResult> {
        let clean: Vec<Clean> = rows
            .iter()
            .filter_map(|row| {
                let value = row.metric_value.filter(|v| v.is_finite())?;
                Some(Clean {
                    entity_id: row.entity_id,
                    value,
                    sample_size: row.sample_size,
                })
            })
            .collect();

        let values: Vec<f64> = clean.iter().map(|c| c.value).collect();
        let Some(summary) = summarize(&values) else {
            return Vec::new();
        };

        let direction = pattern.order_direction;
        let z_raw = if summary.is_degenerate() {
            fallback_z(&clean, direction)
        } else {
            clean
                .iter()
                .map(|c| directional_z(c.value, &summary, direction))
                .collect()
        };

        let unicorn_weight = pattern.unicorn_weight;
        let public_weight = pattern.public_weight_or_default();

        let mut scored: Vec<ScoredResult> = clean
            .iter()
            .zip(z_raw)
            .map(|(c, z_raw)| {
                let z_adjusted = z_raw * sample_weight(c.sample_size, pattern.target_sample);
                let score = z_adjusted * unicorn_weight * public_weight * market.get(c.entity_id);
                ScoredResult {
                    run_date,
                    pattern_id: pattern.pattern_id.clone(),
                    entity_type: pattern.entity_type,
                    entity_id: c.entity_id,
                    rank: 0,
                    metric_value: c.value,
                    sample_size: c.sample_size,
                    z_raw,
                    z_adjusted,
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| rank_order(a, b, direction));
        apply_min_score_spacing(&mut scored, self.min_score_gap);
        for (i, r) in scored.iter_mut().enumerate() {
            r.rank = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }

        tracing::debug!(
            pattern_id = %pattern.pattern_id,
            rows = rows.len(),
            scored = scored.len(),
            mean = summary.mean,
            std_dev = summary.std_dev,
            fallback = summary.is_degenerate(),
            "pattern scored"
        );
        scored
    }
}

/// Higher is always better: `asc` patterns flip the sign.
fn directional_z(value: f64, summary: &Summary, direction: OrderDirection) -> f64 {
    match direction {
        OrderDirection::Desc => (value - summary.mean) / summary.std_dev,
        OrderDirection::Asc => (summary.mean - value) / summary.std_dev,
    }
}

/// Rank-based z in input order. Equal values keep entity-id order.
fn fallback_z(clean: &[Clean], direction: OrderDirection) -> Vec<f64> {
    let mut order: Vec<usize> = (0..clean.len()).collect();
    order.sort_by(|&a, &b| {
        direction
            .better_first(clean[a].value, clean[b].value)
            .then(clean[a].entity_id.cmp(&clean[b].entity_id))
    });
    let mut z = vec![0.0; clean.len()];
    for (position, &index) in order.iter().enumerate() {
        z[index] = rank_based_z(clean.len(), position);
    }
    z
}

/// Score desc, then larger sample, better metric, entity id.
fn rank_order(a: &ScoredResult, b: &ScoredResult, direction: OrderDirection) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(b.sample_size.cmp(&a.sample_size))
        .then(direction.better_first(a.metric_value, b.metric_value))
        .then(a.entity_id.cmp(&b.entity_id))
}
