//! players / teams lookups.

use rusqlite::{params_from_iter, Connection};
use rustc_hash::FxHashMap;
use unicorn_core::errors::StorageError;
use unicorn_core::types::{EntityId, EntityProfile};

/// Ids per `IN (...)` statement.
const CHUNK: usize = 500;

/// Name and current team of each known player in `entity_ids`.
pub fn entity_profiles(
    conn: &Connection,
    entity_ids: &[EntityId],
) -> Result<FxHashMap<EntityId, EntityProfile>, StorageError> {
    let mut profiles = FxHashMap::default();
    for chunk in entity_ids.chunks(CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT p.player_id, p.full_name, t.team_name
             FROM players p LEFT JOIN teams t ON t.team_id = p.current_team_id
             WHERE p.player_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql).map_err(crate::sqlite_err)?;
        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), |row| {
                Ok(EntityProfile {
                    entity_id: row.get(0)?,
                    full_name: row.get(1)?,
                    team_name: row.get(2)?,
                })
            })
            .map_err(crate::sqlite_err)?;
        for row in rows {
            let profile = row.map_err(crate::sqlite_err)?;
            profiles.insert(profile.entity_id, profile);
        }
    }
    Ok(profiles)
}
