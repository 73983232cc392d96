use rusqlite::Connection;

use crate::error::Result;

/// Initialise the storage schema in `conn`.
///
/// All statements are idempotent. The index on `game_date` keeps the
/// detector's "games today" query cheap even with seasons of history.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS games (
            id            TEXT    NOT NULL PRIMARY KEY,
            espn_game_id  INTEGER NOT NULL UNIQUE,  -- upstream natural key
            season        INTEGER NOT NULL,
            week          INTEGER NOT NULL,
            game_date     TEXT    NOT NULL,         -- ISO-8601 UTC kickoff
            home_team     TEXT    NOT NULL,
            away_team     TEXT    NOT NULL,
            home_score    INTEGER NOT NULL DEFAULT 0,
            away_score    INTEGER NOT NULL DEFAULT 0,
            status        TEXT    NOT NULL DEFAULT 'scheduled',
            created_at    TEXT    NOT NULL,
            updated_at    TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_games_game_date ON games (game_date);
        CREATE INDEX IF NOT EXISTS idx_games_season_week ON games (season, week);

        CREATE TABLE IF NOT EXISTS game_team_stats (
            game_id        TEXT    NOT NULL REFERENCES games(id),
            team           TEXT    NOT NULL,
            total_yards    INTEGER NOT NULL DEFAULT 0,
            passing_yards  INTEGER NOT NULL DEFAULT 0,
            rushing_yards  INTEGER NOT NULL DEFAULT 0,
            turnovers      INTEGER NOT NULL DEFAULT 0,
            updated_at     TEXT    NOT NULL,
            UNIQUE (game_id, team)
        ) STRICT;

        CREATE TABLE IF NOT EXISTS injuries (
            player_id   TEXT    NOT NULL,
            season      INTEGER NOT NULL,
            team        TEXT    NOT NULL,
            status      TEXT    NOT NULL,
            detail      TEXT    NOT NULL DEFAULT '',
            updated_at  TEXT    NOT NULL,
            UNIQUE (player_id, season)
        ) STRICT;
        ",
    )?;
    Ok(())
}
