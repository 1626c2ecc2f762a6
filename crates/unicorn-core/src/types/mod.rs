//! Domain types shared across the unicorn crates.

pub mod filter;
pub mod market;
pub mod metric;
pub mod pattern;
pub mod query;
pub mod results;
pub mod schema;

pub use filter::{Filter, FilterOp, FilterSpec, FilterValue};
pub use market::{MarketContext, MarketWeights};
pub use metric::AggregationExpr;
pub use pattern::{EntityType, OrderDirection, PatternTemplate};
pub use query::MetricQuery;
pub use results::{EntityId, EntityProfile, MetricRow, ScoredResult, TopEntry};
pub use schema::{BaseTable, Concept, FieldDef, FieldKind};
