//! SQLite-backed `FactStore`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rusqlite::{params_from_iter, Connection, ErrorCode};
use rustc_hash::FxHashMap;
use unicorn_core::errors::StorageError;
use unicorn_core::traits::FactStore;
use unicorn_core::types::{EntityId, EntityProfile, MarketWeights, MetricQuery, MetricRow};

use crate::connection::DatabaseManager;
use crate::queries;
use crate::sql::render_metric_query;

/// SQLite progress handler granularity, in virtual machine instructions.
const PROGRESS_OPS: i32 = 1_000;

/// Reads facts through the database's read pool.
#[derive(Clone)]
pub struct SqliteFactStore {
    db: Arc<DatabaseManager>,
}

impl SqliteFactStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

impl FactStore for SqliteFactStore {
    fn aggregate(
        &self,
        query: &MetricQuery,
        timeout: Option<Duration>,
    ) -> Result<Vec<MetricRow>, StorageError> {
        let rendered = render_metric_query(query)?;
        self.db.with_reader(|conn| {
            if let Some(budget) = timeout {
                let deadline = Instant::now() + budget;
                conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));
            }
            let result = run_aggregate(conn, &rendered.sql, &rendered.params);
            if timeout.is_some() {
                conn.progress_handler(0, None::<fn() -> bool>);
            }
            result.map_err(|e| match e {
                rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::OperationInterrupted => {
                    StorageError::QueryTimeout {
                        timeout_ms: timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
                    }
                }
                other => crate::sqlite_err(other),
            })
        })
    }

    fn market_weights(&self, season_year: Option<i32>) -> Result<MarketWeights, StorageError> {
        self.db
            .with_reader(|conn| queries::market::market_weights_by_entity(conn, season_year))
    }

    fn entity_profiles(
        &self,
        entity_ids: &[EntityId],
    ) -> Result<FxHashMap<EntityId, EntityProfile>, StorageError> {
        self.db
            .with_reader(|conn| queries::players::entity_profiles(conn, entity_ids))
    }
}

fn run_aggregate(
    conn: &Connection,
    sql: &str,
    params: &[rusqlite::types::Value],
) -> Result<Vec<MetricRow>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        let sample: i64 = row.get(2)?;
        Ok(MetricRow {
            entity_id: row.get(0)?,
            metric_value: row.get(1)?,
            sample_size: u32::try_from(sample).unwrap_or(u32::MAX),
        })
    })?;
    rows.collect()
}
