//! Cross-pattern Top-N selection and leaderboard descriptions.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use unicorn_core::types::{EntityId, EntityProfile, PatternTemplate, ScoredResult, TopEntry};

/// Default leaderboard length.
pub const DEFAULT_TARGET_COUNT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    pub target_count: usize,
    /// At most this many entries from one pattern; `None` is unlimited.
    pub max_per_pattern: Option<usize>,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            max_per_pattern: None,
        }
    }
}

/// Greedy selection over every pattern's results for `run_date`: best
/// score first (ties by pattern id, then entity id), one entry per entity,
/// stopping at `limits.target_count`. Fewer candidates give a shorter list.
/// Descriptions are left empty; see [`describe`].
pub fn select_top(
    run_date: NaiveDate,
    results: &[ScoredResult],
    limits: SelectionLimits,
) -> Vec<TopEntry> {
    let mut candidates: Vec<&ScoredResult> =
        results.iter().filter(|r| r.score.is_finite()).collect();
    candidates.sort_by(|a, b| leaderboard_order(a, b));

    let mut seen: FxHashSet<EntityId> = FxHashSet::default();
    let mut per_pattern: FxHashMap<&str, usize> = FxHashMap::default();
    let mut top = Vec::with_capacity(limits.target_count.min(candidates.len()));

    for candidate in candidates {
        if top.len() >= limits.target_count {
            break;
        }
        if seen.contains(&candidate.entity_id) {
            continue;
        }
        if let Some(cap) = limits.max_per_pattern {
            let taken = per_pattern.entry(candidate.pattern_id.as_str()).or_default();
            if *taken >= cap {
                continue;
            }
            *taken += 1;
        }
        seen.insert(candidate.entity_id);
        top.push(TopEntry {
            run_date,
            rank: u32::try_from(top.len() + 1).unwrap_or(u32::MAX),
            entity_type: candidate.entity_type,
            entity_id: candidate.entity_id,
            pattern_id: candidate.pattern_id.clone(),
            metric_value: candidate.metric_value,
            sample_size: candidate.sample_size,
            score: candidate.score,
            description: String::new(),
        });
    }
    top
}

fn leaderboard_order(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        .then(a.entity_id.cmp(&b.entity_id))
}

/// Fill each entry's description from its pattern's template.
pub fn describe(
    entries: &mut [TopEntry],
    patterns: &FxHashMap<&str, &PatternTemplate>,
    profiles: &FxHashMap<EntityId, EntityProfile>,
) {
    for entry in entries {
        if let Some(pattern) = patterns.get(entry.pattern_id.as_str()) {
            entry.description = render_description(
                &pattern.description_template,
                profiles.get(&entry.entity_id),
                Some(entry.metric_value),
            );
        }
    }
}

/// Substitute `{{player_name}}`, `{{team_name}}` and `{{metric_value}}`
/// (three decimals). Missing values render as empty strings.
pub fn render_description(
    template: &str,
    profile: Option<&EntityProfile>,
    metric_value: Option<f64>,
) -> String {
    if template.is_empty() {
        return String::new();
    }
    let player = profile.map(|p| p.full_name.as_str()).unwrap_or("");
    let team = profile.and_then(|p| p.team_name.as_deref()).unwrap_or("");
    let metric = metric_value
        .map(|v| format!("{v:.3}"))
        .unwrap_or_default();
    template
        .replace("{{player_name}}", player)
        .replace("{{team_name}}", team)
        .replace("{{metric_value}}", &metric)
}
