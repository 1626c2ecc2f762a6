//! unicorn_results / unicorn_top50_daily read-back.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use unicorn_core::errors::StorageError;
use unicorn_core::types::{EntityType, ScoredResult, TopEntry};

fn entity_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<EntityType> {
    let raw: String = row.get(idx)?;
    EntityType::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown entity_type '{raw}'").into(),
        )
    })
}

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let v: i64 = row.get(idx)?;
    Ok(u32::try_from(v).unwrap_or(0))
}

/// Published leaderboard for a date, ordered by rank.
pub fn top_entries_for_date(
    conn: &Connection,
    run_date: NaiveDate,
) -> Result<Vec<TopEntry>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT run_date, rank, entity_type, entity_id, pattern_id, metric_value,
                    sample_size, score, description
             FROM unicorn_top50_daily WHERE run_date = ?1 ORDER BY rank",
        )
        .map_err(crate::sqlite_err)?;
    let rows = stmt
        .query_map(params![run_date], |row| {
            Ok(TopEntry {
                run_date: row.get(0)?,
                rank: count(row, 1)?,
                entity_type: entity_type(row, 2)?,
                entity_id: row.get(3)?,
                pattern_id: row.get(4)?,
                metric_value: row.get(5)?,
                sample_size: count(row, 6)?,
                score: row.get(7)?,
                description: row.get(8)?,
            })
        })
        .map_err(crate::sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(crate::sqlite_err)
}

/// Published per-pattern results for a date, ordered by pattern then rank.
pub fn scored_results_for_date(
    conn: &Connection,
    run_date: NaiveDate,
) -> Result<Vec<ScoredResult>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT run_date, pattern_id, entity_type, entity_id, rank, metric_value,
                    sample_size, z_raw, z_adjusted, score
             FROM unicorn_results WHERE run_date = ?1 ORDER BY pattern_id, rank, entity_id",
        )
        .map_err(crate::sqlite_err)?;
    let rows = stmt
        .query_map(params![run_date], |row| {
            Ok(ScoredResult {
                run_date: row.get(0)?,
                pattern_id: row.get(1)?,
                entity_type: entity_type(row, 2)?,
                entity_id: row.get(3)?,
                rank: count(row, 4)?,
                metric_value: row.get(5)?,
                sample_size: count(row, 6)?,
                z_raw: row.get::<_, Option<f64>>(7)?.unwrap_or(f64::NAN),
                z_adjusted: row.get::<_, Option<f64>>(8)?.unwrap_or(f64::NAN),
                score: row.get(9)?,
            })
        })
        .map_err(crate::sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(crate::sqlite_err)
}

/// Run dates with a published leaderboard, newest first.
pub fn published_dates(conn: &Connection) -> Result<Vec<NaiveDate>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT run_date FROM unicorn_top50_daily ORDER BY run_date DESC")
        .map_err(crate::sqlite_err)?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(crate::sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(crate::sqlite_err)
}

/// Rows left in the staging area for a date.
pub fn staged_count(conn: &Connection, run_date: NaiveDate) -> Result<usize, StorageError> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM unicorn_results_staging WHERE run_date = ?1",
            params![run_date],
            |row| row.get(0),
        )
        .map_err(crate::sqlite_err)?;
    Ok(usize::try_from(n).unwrap_or(0))
}
