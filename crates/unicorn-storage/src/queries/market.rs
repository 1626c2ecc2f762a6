//! team_market_context queries.

use rusqlite::{params, Connection};
use unicorn_core::errors::StorageError;
use unicorn_core::types::{MarketContext, MarketWeights};

/// Adjusted market weight of every player whose current team has context.
pub fn market_weights_by_entity(
    conn: &Connection,
    season_year: Option<i32>,
) -> Result<MarketWeights, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT p.player_id, m.team_id, m.attendance_score, m.media_score, m.market_weight
             FROM players p
             JOIN team_market_context m ON m.team_id = p.current_team_id
             WHERE (?1 IS NULL OR m.season_year = ?1)
             ORDER BY p.player_id, m.season_year DESC",
        )
        .map_err(crate::sqlite_err)?;
    let rows = stmt
        .query_map(params![season_year], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<f64>>(4)?,
            ))
        })
        .map_err(crate::sqlite_err)?;

    let mut weights = MarketWeights::new();
    let mut last_player = None;
    for row in rows {
        let (player_id, team_id, attendance, media, weight) = row.map_err(crate::sqlite_err)?;
        // Rows are ordered newest season first per player.
        if last_player == Some(player_id) {
            continue;
        }
        last_player = Some(player_id);
        let ctx = to_context(team_id, attendance, media, weight);
        weights.insert(player_id, ctx.market_weight_adj);
    }
    Ok(weights)
}

/// A stored weight wins over scores; scores are used when it is missing.
fn to_context(
    team_id: i64,
    attendance: Option<f64>,
    media: Option<f64>,
    weight: Option<f64>,
) -> MarketContext {
    match weight {
        Some(w) => MarketContext::from_weight(team_id, w),
        None => MarketContext::from_scores(
            team_id,
            attendance.unwrap_or(f64::NAN),
            media.unwrap_or(f64::NAN),
        ),
    }
}
