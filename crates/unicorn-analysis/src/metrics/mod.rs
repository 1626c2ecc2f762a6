//! Metric registry: logical metric name → aggregation expression.
//!
//! Adding a metric means adding a `Metric` implementation and registering
//! it; neither the query builder nor the scorer changes.

pub mod builtin;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use unicorn_core::errors::PatternError;
use unicorn_core::types::{AggregationExpr, PatternTemplate};

/// A named aggregation over a pattern's filtered rows.
pub trait Metric: Send + Sync {
    /// Name patterns refer to in their `metric` field.
    fn name(&self) -> &'static str;

    /// Aggregation producing the metric value; the sample size is always
    /// the filtered row count.
    fn expression(&self) -> AggregationExpr;
}

/// Raised when a second metric is registered under an existing name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("metric '{name}' is already registered")]
pub struct DuplicateMetric {
    pub name: String,
}

/// Append-only name → metric map. Every successful registration bumps
/// `version`.
#[derive(Clone)]
pub struct MetricRegistry {
    version: u32,
    metrics: FxHashMap<&'static str, Arc<dyn Metric>>,
}

impl MetricRegistry {
    /// An empty registry at version 0.
    pub fn empty() -> Self {
        Self {
            version: 0,
            metrics: FxHashMap::default(),
        }
    }

    /// Registry holding every built-in metric.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for metric in builtin::all() {
            // Built-in names are distinct.
            let _ = registry.register_arc(metric);
        }
        registry
    }

    pub fn register<M: Metric + 'static>(&mut self, metric: M) -> Result<(), DuplicateMetric> {
        self.register_arc(Arc::new(metric))
    }

    fn register_arc(&mut self, metric: Arc<dyn Metric>) -> Result<(), DuplicateMetric> {
        let name = metric.name();
        if self.metrics.contains_key(name) {
            return Err(DuplicateMetric {
                name: name.to_string(),
            });
        }
        self.metrics.insert(name, metric);
        self.version += 1;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Metric>> {
        self.metrics.get(name)
    }

    /// Expression for the pattern's metric. An explicit `metric_expr` on the
    /// pattern takes precedence over the registry.
    pub fn resolve(&self, pattern: &PatternTemplate) -> Result<AggregationExpr, PatternError> {
        if let Some(expr) = &pattern.metric_expr {
            return Ok(expr.clone());
        }
        self.get(&pattern.metric)
            .map(|m| m.expression())
            .ok_or_else(|| PatternError::UnknownMetric {
                pattern_id: pattern.pattern_id.clone(),
                metric: pattern.metric.clone(),
            })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.metrics.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("version", &self.version)
            .field("metrics", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_core::types::{BaseTable, EntityType, Filter, FilterValue, OrderDirection};

    struct CountWalks;

    impl Metric for CountWalks {
        fn name(&self) -> &'static str {
            "count_walks"
        }

        fn expression(&self) -> AggregationExpr {
            AggregationExpr::Count {
                when: vec![Filter::eq("is_bb", FilterValue::Bool(true))],
            }
        }
    }

    fn pattern(metric: &str) -> PatternTemplate {
        PatternTemplate {
            pattern_id: "UNQ-T-1".into(),
            name: String::new(),
            description_template: String::new(),
            entity_type: EntityType::Batter,
            base_table: BaseTable::PaFacts,
            category: None,
            enabled: true,
            filters: Vec::new(),
            order_direction: OrderDirection::Desc,
            metric: metric.into(),
            metric_expr: None,
            target_sample: 0,
            min_sample: 1,
            unicorn_weight: 1.0,
            public_weight: None,
            complexity_score: None,
            requires_count: false,
            count_value: None,
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = MetricRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec![
                "avg_ev",
                "chase_rate",
                "contact_rate",
                "count_barrels",
                "count_hr",
                "count_strikeouts",
                "hard_hit_rate",
                "hr_rate",
                "whiff_rate",
                "xwoba_avg",
            ]
        );
        assert_eq!(registry.version(), 10);
    }

    #[test]
    fn test_unknown_metric() {
        let err = MetricRegistry::builtin().resolve(&pattern("nope")).unwrap_err();
        assert!(matches!(err, PatternError::UnknownMetric { ref metric, .. } if metric == "nope"));
    }

    #[test]
    fn test_register_extends_without_touching_builtins() {
        let mut registry = MetricRegistry::builtin();
        registry.register(CountWalks).unwrap();
        assert_eq!(registry.version(), 11);
        assert!(registry.resolve(&pattern("count_walks")).is_ok());
        assert_eq!(
            registry.register(CountWalks),
            Err(DuplicateMetric {
                name: "count_walks".into()
            })
        );
        assert_eq!(registry.version(), 11);
    }

    #[test]
    fn test_metric_expr_override_wins() {
        let mut p = pattern("not_registered");
        p.metric_expr = Some(AggregationExpr::count_all());
        assert_eq!(
            MetricRegistry::builtin().resolve(&p).unwrap(),
            AggregationExpr::count_all()
        );
    }
}
