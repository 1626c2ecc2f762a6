//! Load-time pattern validation.
//!
//! Verdicts are a pure function of the pattern: no I/O, no shared state.

use unicorn_core::errors::RejectionReason;
use unicorn_core::types::{Concept, Filter, FilterValue, PatternTemplate};

/// Highest complexity a pattern may declare.
pub const MAX_COMPLEXITY: u32 = 4;
/// Highest number of filter conditions a pattern may carry.
pub const MAX_CONDITIONS: usize = 4;
/// Pitch counts a pattern may target.
pub const ALLOWED_COUNTS: [&str; 3] = ["3-0", "0-2", "3-2"];

const COUNT_FIELD: &str = "count_str";

/// Enforces the global pattern invariants.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternValidator;

impl PatternValidator {
    pub fn new() -> Self {
        Self
    }

    /// First violated rule, checked in order: complexity, count whitelist,
    /// banned concepts, context stacking.
    pub fn validate(&self, pattern: &PatternTemplate) -> Result<(), RejectionReason> {
        check_complexity(pattern)?;
        check_count_value(pattern)?;

        let conditions = all_conditions(pattern);
        for filter in &conditions {
            check_count_filter(filter)?;
            check_banned(pattern, filter)?;
        }
        if let Some(expr) = &pattern.metric_expr {
            for field in expr.fields() {
                if let Some(concept) = field_concept(pattern, field).filter(Concept::is_banned) {
                    return Err(RejectionReason::BannedConcept {
                        field: field.to_string(),
                        concept,
                    });
                }
            }
        }
        check_context_stacking(pattern, &conditions)
    }

    pub fn is_valid(&self, pattern: &PatternTemplate) -> bool {
        self.validate(pattern).is_ok()
    }
}

fn check_complexity(pattern: &PatternTemplate) -> Result<(), RejectionReason> {
    let score = pattern.effective_complexity();
    if score > MAX_COMPLEXITY {
        return Err(RejectionReason::ComplexityExceeded {
            score,
            max: MAX_COMPLEXITY,
        });
    }
    if pattern.filters.len() > MAX_CONDITIONS {
        return Err(RejectionReason::TooManyConditions {
            count: pattern.filters.len(),
            max: MAX_CONDITIONS,
        });
    }
    Ok(())
}

fn check_count_value(pattern: &PatternTemplate) -> Result<(), RejectionReason> {
    match pattern.count_value.as_deref() {
        Some(value) if !ALLOWED_COUNTS.contains(&value) => Err(RejectionReason::DisallowedCount {
            value: value.to_string(),
        }),
        None if pattern.requires_count => Err(RejectionReason::MissingRequiredCount),
        _ => Ok(()),
    }
}

/// Pattern filters plus the conditions embedded in a metric override.
fn all_conditions(pattern: &PatternTemplate) -> Vec<&Filter> {
    let mut conditions: Vec<&Filter> = pattern.filters.iter().collect();
    if let Some(expr) = &pattern.metric_expr {
        conditions.extend(expr.filters());
    }
    conditions
}

fn check_count_filter(filter: &Filter) -> Result<(), RejectionReason> {
    if filter.field != COUNT_FIELD {
        return Ok(());
    }
    for value in filter.values() {
        let allowed = matches!(value, FilterValue::Text(s) if ALLOWED_COUNTS.contains(&s.as_str()));
        if !allowed {
            return Err(RejectionReason::DisallowedCountFilter {
                field: filter.field.clone(),
                value: match value {
                    FilterValue::Text(s) => s.clone(),
                    other => other.to_string(),
                },
            });
        }
    }
    Ok(())
}

/// Schema concept of a field, falling back to the field name's wording.
fn field_concept(pattern: &PatternTemplate, field: &str) -> Option<Concept> {
    Concept::banned_in_text(field).or_else(|| pattern.base_table.field(field).map(|f| f.concept))
}

fn check_banned(pattern: &PatternTemplate, filter: &Filter) -> Result<(), RejectionReason> {
    let banned = |concept: Concept| RejectionReason::BannedConcept {
        field: filter.field.clone(),
        concept,
    };
    if let Some(concept) = field_concept(pattern, &filter.field).filter(Concept::is_banned) {
        return Err(banned(concept));
    }
    for value in filter.values() {
        if let Some(concept) = value.as_text().and_then(Concept::banned_in_text) {
            return Err(banned(concept));
        }
    }
    Ok(())
}

fn check_context_stacking(
    pattern: &PatternTemplate,
    conditions: &[&Filter],
) -> Result<(), RejectionReason> {
    let has = |concept: Concept| {
        conditions
            .iter()
            .any(|f| field_concept(pattern, &f.field) == Some(concept))
    };
    if has(Concept::HomeAway) && has(Concept::PitchType) && has(Concept::Location) {
        return Err(RejectionReason::ContextStacking);
    }
    Ok(())
}
