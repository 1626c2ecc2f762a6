//! Pattern → `MetricQuery` translation.
//!
//! Every field the query will touch is resolved against the base table's
//! schema here, so the fact store only ever sees known columns and operands
//! of the right type.

use std::sync::Arc;

use chrono::NaiveDate;
use unicorn_core::errors::PatternError;
use unicorn_core::types::{
    AggregationExpr, FieldDef, FieldKind, Filter, FilterOp, FilterValue, MetricQuery,
    PatternTemplate,
};

use crate::metrics::MetricRegistry;

/// Default row cap for a single pattern query.
pub const DEFAULT_MAX_ROWS: u32 = 500;

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    registry: Arc<MetricRegistry>,
    max_rows: u32,
}

impl QueryBuilder {
    pub fn new(registry: Arc<MetricRegistry>, max_rows: u32) -> Self {
        Self {
            registry,
            max_rows: max_rows.max(1),
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Build the grouped aggregation for `pattern` as of `as_of` (inclusive).
    pub fn build(
        &self,
        pattern: &PatternTemplate,
        as_of: NaiveDate,
    ) -> Result<MetricQuery, PatternError> {
        let metric = self.registry.resolve(pattern)?;

        for filter in &pattern.filters {
            check_filter(pattern, filter)?;
        }
        check_metric(pattern, &metric)?;

        Ok(MetricQuery {
            pattern_id: pattern.pattern_id.clone(),
            base_table: pattern.base_table,
            entity_type: pattern.entity_type,
            filters: pattern.filters.clone(),
            metric,
            as_of,
            min_sample: pattern.min_sample,
            order: pattern.order_direction,
            limit: self.max_rows,
        })
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(Arc::new(MetricRegistry::builtin()), DEFAULT_MAX_ROWS)
    }
}

fn resolve(pattern: &PatternTemplate, field: &str) -> Result<&'static FieldDef, PatternError> {
    pattern
        .base_table
        .field(field)
        .ok_or_else(|| PatternError::UnknownField {
            pattern_id: pattern.pattern_id.clone(),
            field: field.to_string(),
            table: pattern.base_table,
        })
}

fn check_metric(pattern: &PatternTemplate, metric: &AggregationExpr) -> Result<(), PatternError> {
    match metric {
        AggregationExpr::Average { field } | AggregationExpr::Sum { field } => {
            let def = resolve(pattern, field)?;
            if def.kind.is_numeric() {
                Ok(())
            } else {
                Err(invalid(
                    pattern,
                    field,
                    format!("cannot aggregate {} field numerically", def.kind.name()),
                ))
            }
        }
        _ => metric
            .filters()
            .into_iter()
            .try_for_each(|f| check_filter(pattern, f)),
    }
}

fn check_filter(pattern: &PatternTemplate, filter: &Filter) -> Result<(), PatternError> {
    let def = resolve(pattern, &filter.field)?;
    let fits = |value: &FilterValue| operand_fits(def.kind, value);
    let ok = match &filter.op {
        FilterOp::Eq(v) | FilterOp::Ne(v) => fits(v),
        FilterOp::In(vs) | FilterOp::NotIn(vs) => vs.iter().all(fits),
        FilterOp::Gt(t) | FilterOp::Gte(t) | FilterOp::Lt(t) | FilterOp::Lte(t) => {
            def.kind.is_numeric() && t.is_finite()
        }
        FilterOp::IsNull | FilterOp::IsNotNull => true,
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(
            pattern,
            &filter.field,
            format!(
                "operator '{}' with {:?} does not fit a {} field",
                filter.op.symbol(),
                filter.values(),
                def.kind.name()
            ),
        ))
    }
}

fn operand_fits(kind: FieldKind, value: &FilterValue) -> bool {
    match (kind, value) {
        (FieldKind::Bool, FilterValue::Bool(_)) => true,
        (FieldKind::Bool, FilterValue::Int(i)) => *i == 0 || *i == 1,
        (FieldKind::Int, FilterValue::Int(_)) => true,
        (FieldKind::Real, FilterValue::Int(_)) => true,
        (FieldKind::Real, FilterValue::Real(r)) => r.is_finite(),
        (FieldKind::Text, FilterValue::Text(_)) => true,
        _ => false,
    }
}

fn invalid(pattern: &PatternTemplate, field: &str, message: String) -> PatternError {
    PatternError::InvalidFilter {
        pattern_id: pattern.pattern_id.clone(),
        field: field.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_core::types::{BaseTable, EntityType, OrderDirection};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn pattern(table: BaseTable, metric: &str, filters: Vec<Filter>) -> PatternTemplate {
        PatternTemplate {
            pattern_id: "UNQ-T-1".into(),
            name: String::new(),
            description_template: String::new(),
            entity_type: EntityType::Pitcher,
            base_table: table,
            category: None,
            enabled: true,
            filters,
            order_direction: OrderDirection::Asc,
            metric: metric.into(),
            metric_expr: None,
            target_sample: 50,
            min_sample: 25,
            unicorn_weight: 1.0,
            public_weight: None,
            complexity_score: None,
            requires_count: false,
            count_value: None,
        }
    }

    #[test]
    fn test_build_carries_pattern_shape() {
        let p = pattern(
            BaseTable::PitchFacts,
            "whiff_rate",
            vec![Filter::new("vel", FilterOp::Gte(95.0))],
        );
        let q = QueryBuilder::default().build(&p, date()).unwrap();
        assert_eq!(q.pattern_id, "UNQ-T-1");
        assert_eq!(q.entity_type, EntityType::Pitcher);
        assert_eq!(q.order, OrderDirection::Asc);
        assert_eq!(q.min_sample, 25);
        assert_eq!(q.limit, DEFAULT_MAX_ROWS);
        assert_eq!(q.as_of, date());
        assert!(matches!(q.metric, AggregationExpr::Ratio { .. }));
    }

    #[test]
    fn test_unknown_filter_field() {
        let p = pattern(
            BaseTable::PitchFacts,
            "count_hr",
            vec![Filter::eq("spin_axis", FilterValue::Int(1))],
        );
        let err = QueryBuilder::default().build(&p, date()).unwrap_err();
        assert!(matches!(err, PatternError::UnknownField { ref field, .. } if field == "spin_axis"));
    }

    #[test]
    fn test_metric_field_must_exist_on_base_table() {
        // xwoba lives on plate appearances only.
        let p = pattern(BaseTable::PitchFacts, "xwoba_avg", Vec::new());
        let err = QueryBuilder::default().build(&p, date()).unwrap_err();
        assert!(matches!(err, PatternError::UnknownField { ref field, .. } if field == "xwoba"));

        let p = pattern(BaseTable::PaFacts, "xwoba_avg", Vec::new());
        assert!(QueryBuilder::default().build(&p, date()).is_ok());
    }

    #[test]
    fn test_operand_type_mismatch() {
        let builder = QueryBuilder::default();
        let text_threshold = pattern(
            BaseTable::PitchFacts,
            "count_hr",
            vec![Filter::new("pitch_type", FilterOp::Gt(3.0))],
        );
        assert!(matches!(
            builder.build(&text_threshold, date()),
            Err(PatternError::InvalidFilter { .. })
        ));

        let text_for_bool = pattern(
            BaseTable::PitchFacts,
            "count_hr",
            vec![Filter::eq("is_barrel", FilterValue::Text("yes".into()))],
        );
        assert!(builder.build(&text_for_bool, date()).is_err());

        let int_for_real = pattern(
            BaseTable::PitchFacts,
            "count_hr",
            vec![Filter::eq("launch_speed", FilterValue::Int(100))],
        );
        assert!(builder.build(&int_for_real, date()).is_ok());
    }

    #[test]
    fn test_row_cap() {
        let builder = QueryBuilder::new(Arc::new(MetricRegistry::builtin()), 20);
        let p = pattern(BaseTable::PitchFacts, "count_hr", Vec::new());
        assert_eq!(builder.build(&p, date()).unwrap().limit, 20);
    }

    #[test]
    fn test_game_fields_are_joinable() {
        let p = pattern(
            BaseTable::PitchFacts,
            "count_hr",
            vec![Filter::eq("games.venue_id", FilterValue::Int(1))],
        );
        assert!(QueryBuilder::default().build(&p, date()).is_ok());
    }
}
