#![allow(dead_code)]

use std::sync::Arc;

use rusqlite::params;
use unicorn_core::config::StorageConfig;
use unicorn_storage::DatabaseManager;

pub fn open_db(dir: &tempfile::TempDir) -> Arc<DatabaseManager> {
    Arc::new(DatabaseManager::open(&dir.path().join("unicorn.db"), &StorageConfig::default()).unwrap())
}

pub fn exec(db: &DatabaseManager, sql: &str) {
    db.with_writer(|conn| {
        conn.execute_batch(sql).unwrap();
        Ok(())
    })
    .unwrap();
}

/// Teams 1 (big market) and 2 (no context), players 10..=13, two games.
pub fn seed_reference(db: &DatabaseManager) {
    exec(
        db,
        "INSERT INTO teams (team_id, team_name, abbrev) VALUES (1, 'Harbor City', 'HC'), (2, 'Plainsville', 'PV');
         INSERT INTO players (player_id, full_name, current_team_id) VALUES
            (10, 'Ava Stone', 1), (11, 'Ben Ortiz', 1), (12, 'Cy Walker', 2), (13, 'Dee Park', NULL);
         INSERT INTO games (game_id, game_date, home_team_id, away_team_id, venue_id) VALUES
            (100, '2024-05-01', 1, 2, 1), (101, '2024-05-03', 2, 1, 2);
         INSERT INTO team_market_context (team_id, season_year, attendance_score, media_score, market_weight)
            VALUES (1, 2023, 0.2, 0.2, NULL), (1, 2024, NULL, NULL, 1.30);",
    );
}

/// Insert `n` pitches for `batter` in `game`, the first `barrels` of them barrels.
pub fn add_pitches(db: &DatabaseManager, game: i64, batter: i64, n: usize, barrels: usize) {
    db.with_writer(|conn| {
        let mut stmt = conn
            .prepare(
                "INSERT INTO pitch_facts (game_id, batter_id, pitcher_id, pitch_type, is_barrel,
                                          launch_speed, count_str, result_pitch)
                 VALUES (?1, ?2, 13, 'SL', ?3, ?4, '3-0', 'in_play')",
            )
            .unwrap();
        for i in 0..n {
            let barrel = i < barrels;
            stmt.execute(params![game, batter, barrel, if barrel { 105.0 } else { 80.0 }])
                .unwrap();
        }
        Ok(())
    })
    .unwrap();
}
