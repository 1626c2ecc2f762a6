//! v001: fact tables, reference data and the pattern catalog table.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    team_id   INTEGER PRIMARY KEY,
    team_name TEXT NOT NULL,
    abbrev    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
    player_id       INTEGER PRIMARY KEY,
    mlb_id          INTEGER UNIQUE,
    full_name       TEXT NOT NULL,
    bat_side        TEXT,
    throw_side      TEXT,
    primary_pos     TEXT,
    current_team_id INTEGER REFERENCES teams(team_id)
);

CREATE TABLE IF NOT EXISTS games (
    game_id       INTEGER PRIMARY KEY,
    game_date     TEXT NOT NULL,
    home_team_id  INTEGER REFERENCES teams(team_id),
    away_team_id  INTEGER REFERENCES teams(team_id),
    venue_id      INTEGER,
    is_day_game   INTEGER,
    is_night_game INTEGER,
    UNIQUE (game_date, home_team_id, away_team_id)
);
CREATE INDEX IF NOT EXISTS idx_games_date ON games(game_date);

CREATE TABLE IF NOT EXISTS pitch_facts (
    pitch_id             INTEGER PRIMARY KEY,
    game_id              INTEGER REFERENCES games(game_id),
    pa_id                INTEGER,
    inning               INTEGER,
    top_bottom           TEXT,
    batter_id            INTEGER REFERENCES players(player_id),
    pitcher_id           INTEGER REFERENCES players(player_id),
    pitch_number_pa      INTEGER,
    pitch_number_game    INTEGER,
    pitch_type           TEXT,
    vel                  REAL,
    spin_rate            REAL,
    count_balls_before   INTEGER,
    count_strikes_before INTEGER,
    is_in_zone           INTEGER,
    result_pitch         TEXT,
    is_last_pitch_of_pa  INTEGER,
    launch_speed         REAL,
    launch_angle         REAL,
    spray_angle          REAL,
    is_barrel            INTEGER,
    is_hard_hit          INTEGER,
    batted_ball_type     TEXT,
    hit_direction        TEXT,
    loc_high_mid_low     TEXT,
    loc_in_mid_out       TEXT,
    loc_region           TEXT,
    pa_outcome           TEXT,
    is_hr                INTEGER,
    is_hit               INTEGER,
    is_walk              INTEGER,
    count_str            TEXT
);
CREATE INDEX IF NOT EXISTS idx_pitch_facts_batter ON pitch_facts(batter_id);
CREATE INDEX IF NOT EXISTS idx_pitch_facts_pitcher ON pitch_facts(pitcher_id);
CREATE INDEX IF NOT EXISTS idx_pitch_facts_game ON pitch_facts(game_id);
CREATE INDEX IF NOT EXISTS idx_pitch_facts_count_str ON pitch_facts(count_str);

CREATE TABLE IF NOT EXISTS pa_facts (
    pa_id              INTEGER PRIMARY KEY,
    game_id            INTEGER REFERENCES games(game_id),
    inning             INTEGER,
    top_bottom         TEXT,
    batter_id          INTEGER REFERENCES players(player_id),
    pitcher_id         INTEGER REFERENCES players(player_id),
    result             TEXT,
    is_hit             INTEGER,
    is_hr              INTEGER,
    is_bb              INTEGER,
    xwoba              REAL,
    bases_state_before TEXT,
    outs_before        INTEGER,
    score_diff_before  INTEGER,
    bat_order          INTEGER,
    is_risp            INTEGER
);
CREATE INDEX IF NOT EXISTS idx_pa_facts_batter ON pa_facts(batter_id);
CREATE INDEX IF NOT EXISTS idx_pa_facts_pitcher ON pa_facts(pitcher_id);
CREATE INDEX IF NOT EXISTS idx_pa_facts_game ON pa_facts(game_id);

CREATE TABLE IF NOT EXISTS team_market_context (
    team_id           INTEGER NOT NULL REFERENCES teams(team_id),
    season_year       INTEGER NOT NULL,
    attendance_score  REAL,
    media_score       REAL,
    market_weight     REAL,
    market_weight_adj REAL,
    PRIMARY KEY (team_id, season_year)
);

CREATE TABLE IF NOT EXISTS pattern_templates (
    pattern_id           TEXT PRIMARY KEY,
    name                 TEXT NOT NULL,
    description_template TEXT NOT NULL,
    entity_type          TEXT NOT NULL,
    base_table           TEXT NOT NULL,
    category             TEXT,
    enabled              INTEGER NOT NULL DEFAULT 1,
    filters_json         TEXT NOT NULL,
    order_direction      TEXT NOT NULL,
    metric               TEXT NOT NULL,
    metric_expr          TEXT,
    target_sample        INTEGER,
    min_sample           INTEGER NOT NULL DEFAULT 10,
    unicorn_weight       REAL NOT NULL DEFAULT 1.0,
    public_weight        REAL,
    complexity_score     INTEGER,
    requires_count       INTEGER NOT NULL DEFAULT 0,
    count_value          TEXT
);
CREATE INDEX IF NOT EXISTS idx_pattern_enabled ON pattern_templates(enabled);
"#;
