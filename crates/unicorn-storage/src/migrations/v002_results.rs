//! v002: per-pattern results, the staging area and the daily leaderboard.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS unicorn_results (
    run_date     TEXT NOT NULL,
    pattern_id   TEXT NOT NULL,
    entity_type  TEXT NOT NULL,
    entity_id    INTEGER NOT NULL,
    rank         INTEGER NOT NULL,
    metric_value REAL NOT NULL,
    sample_size  INTEGER NOT NULL,
    z_raw        REAL,
    z_adjusted   REAL,
    score        REAL NOT NULL,
    PRIMARY KEY (run_date, pattern_id, entity_id)
);
CREATE INDEX IF NOT EXISTS idx_unicorn_results_score ON unicorn_results(run_date, score);

CREATE TABLE IF NOT EXISTS unicorn_results_staging (
    run_date     TEXT NOT NULL,
    pattern_id   TEXT NOT NULL,
    entity_type  TEXT NOT NULL,
    entity_id    INTEGER NOT NULL,
    rank         INTEGER NOT NULL,
    metric_value REAL NOT NULL,
    sample_size  INTEGER NOT NULL,
    z_raw        REAL,
    z_adjusted   REAL,
    score        REAL NOT NULL,
    PRIMARY KEY (run_date, pattern_id, entity_id)
);

CREATE TABLE IF NOT EXISTS unicorn_top50_daily (
    run_date     TEXT NOT NULL,
    rank         INTEGER NOT NULL,
    entity_type  TEXT NOT NULL,
    entity_id    INTEGER NOT NULL,
    pattern_id   TEXT NOT NULL,
    metric_value REAL NOT NULL,
    sample_size  INTEGER NOT NULL,
    score        REAL NOT NULL,
    description  TEXT NOT NULL,
    PRIMARY KEY (run_date, rank),
    UNIQUE (run_date, entity_id)
);
"#;
