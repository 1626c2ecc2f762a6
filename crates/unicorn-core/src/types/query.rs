//! Fact-store query description produced by the query builder.

use chrono::NaiveDate;

use super::filter::Filter;
use super::metric::AggregationExpr;
use super::pattern::{EntityType, OrderDirection};
use super::schema::BaseTable;

/// A bounded, grouped aggregation over one base table.
///
/// Every field named by `filters` and `metric` has already been checked
/// against `base_table`'s schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub pattern_id: String,
    pub base_table: BaseTable,
    pub entity_type: EntityType,
    pub filters: Vec<Filter>,
    pub metric: AggregationExpr,
    /// Facts from games after this date are invisible.
    pub as_of: NaiveDate,
    pub min_sample: u32,
    pub order: OrderDirection,
    pub limit: u32,
}
