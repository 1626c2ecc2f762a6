//! Read side of the engine: the fact store.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::errors::StorageError;
use crate::types::{EntityId, EntityProfile, MarketWeights, MetricQuery, MetricRow};

/// A queryable snapshot of pitch and plate-appearance facts.
///
/// Implementations must be safe to query from several worker threads at
/// once; the engine never writes through this trait.
pub trait FactStore: Send + Sync {
    /// Executes a grouped aggregation, one row per qualifying entity,
    /// ordered best-first and bounded by `query.limit`.
    ///
    /// When `timeout` elapses the query is aborted with
    /// `StorageError::QueryTimeout`.
    fn aggregate(
        &self,
        query: &MetricQuery,
        timeout: Option<Duration>,
    ) -> Result<Vec<MetricRow>, StorageError>;

    /// Adjusted market weight for every entity whose current team has
    /// market context, optionally restricted to one season.
    fn market_weights(&self, season_year: Option<i32>) -> Result<MarketWeights, StorageError>;

    /// Names and teams for the given entities. Unknown ids are omitted.
    fn entity_profiles(
        &self,
        entity_ids: &[EntityId],
    ) -> Result<FxHashMap<EntityId, EntityProfile>, StorageError>;
}
