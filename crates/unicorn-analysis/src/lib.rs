//! # unicorn-analysis
//!
//! The pattern engine: catalog loading and validation, the metric
//! registry, query construction, scoring, leaderboard selection and the
//! per-date run orchestrator.

pub mod catalog;
pub mod metrics;
pub mod orchestrator;
pub mod query;
pub mod scoring;
pub mod selection;
pub mod validation;

pub use catalog::{CatalogSnapshot, PatternCatalog};
pub use metrics::{Metric, MetricRegistry};
pub use orchestrator::{RunOptions, RunOrchestrator, RunSummary};
pub use query::QueryBuilder;
pub use scoring::Scorer;
pub use validation::PatternValidator;
