use std::sync::Mutex;

use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use gridline_core::season::CANONICAL_TZ;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::{DaySummary, GameUpdate, InjuryUpdate, TeamStatLine};

/// A completed game that has no team-stat rows yet.
#[derive(Debug, Clone)]
pub struct GameNeedingStats {
    pub id: String,
    pub espn_game_id: i64,
}

/// Local mirror of upstream schedule/stat data.
///
/// Thread-safe: wraps the SQLite connection in a Mutex. The lock is
/// held only for the duration of a single statement — never across an
/// external call.
pub struct GameStore {
    db: Mutex<Connection>,
}

impl GameStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Insert or update a game, keyed by the upstream game id.
    ///
    /// Existing rows only have scores, status, and kickoff refreshed —
    /// the internal id and creation time are stable, so re-running a
    /// sync at any interval never duplicates a contest.
    pub fn upsert_game(&self, update: &GameUpdate) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        let kickoff = update.game_date.to_rfc3339();
        let status = update.status.to_string();

        let existing: Option<String> = db
            .query_row(
                "SELECT id FROM games WHERE espn_game_id = ?1",
                [update.espn_game_id],
                |row| row.get(0),
            )
            .ok();

        match existing {
            Some(id) => {
                db.execute(
                    "UPDATE games
                     SET home_score = ?1, away_score = ?2, status = ?3,
                         game_date = ?4, updated_at = ?5
                     WHERE id = ?6",
                    rusqlite::params![
                        update.home_score,
                        update.away_score,
                        status,
                        kickoff,
                        now,
                        id
                    ],
                )?;
                debug!(espn_game_id = update.espn_game_id, %status, "game updated");
            }
            None => {
                let id = Uuid::new_v4().to_string();
                db.execute(
                    "INSERT INTO games
                     (id, espn_game_id, season, week, game_date, home_team, away_team,
                      home_score, away_score, status, created_at, updated_at)
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?11)",
                    rusqlite::params![
                        id,
                        update.espn_game_id,
                        update.season,
                        update.week,
                        kickoff,
                        update.home_team,
                        update.away_team,
                        update.home_score,
                        update.away_score,
                        status,
                        now
                    ],
                )?;
                debug!(espn_game_id = update.espn_game_id, "game inserted");
            }
        }
        Ok(())
    }

    /// Count today's contests by status, where "today" is a canonical-
    /// timezone calendar day.
    pub fn day_summary(&self, day: NaiveDate) -> Result<DaySummary> {
        let (start, end) = day_bounds_utc(day)?;
        let db = self.db.lock().unwrap();

        let mut stmt = db.prepare(
            "SELECT status, COUNT(*) FROM games
             WHERE game_date >= ?1 AND game_date < ?2
             GROUP BY status",
        )?;
        let rows = stmt.query_map([&start, &end], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut summary = DaySummary::default();
        for row in rows {
            let (status, count) = row?;
            match status.as_str() {
                "scheduled" => summary.scheduled = count,
                "in_progress" => summary.live = count,
                "completed" => summary.completed = count,
                other => {
                    return Err(StoreError::MalformedRow(format!(
                        "unknown game status: {other}"
                    )))
                }
            }
        }
        Ok(summary)
    }

    /// Completed games for a season/week with no team-stat rows yet.
    /// An empty result is normal, not an error.
    pub fn completed_without_stats(&self, season: i32, week: u8) -> Result<Vec<GameNeedingStats>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT g.id, g.espn_game_id FROM games g
             WHERE g.season = ?1 AND g.week = ?2 AND g.status = 'completed'
               AND NOT EXISTS (SELECT 1 FROM game_team_stats s WHERE s.game_id = g.id)
             ORDER BY g.game_date",
        )?;
        let games = stmt
            .query_map(rusqlite::params![season, week], |row| {
                Ok(GameNeedingStats {
                    id: row.get(0)?,
                    espn_game_id: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(games)
    }

    /// Upsert one team's box-score line for a game.
    pub fn upsert_team_stats(&self, game_id: &str, line: &TeamStatLine) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO game_team_stats
             (game_id, team, total_yards, passing_yards, rushing_yards, turnovers, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)
             ON CONFLICT (game_id, team) DO UPDATE SET
                 total_yards = excluded.total_yards,
                 passing_yards = excluded.passing_yards,
                 rushing_yards = excluded.rushing_yards,
                 turnovers = excluded.turnovers,
                 updated_at = excluded.updated_at",
            rusqlite::params![
                game_id,
                line.team,
                line.total_yards,
                line.passing_yards,
                line.rushing_yards,
                line.turnovers,
                now
            ],
        )?;
        Ok(())
    }

    /// Upsert an injury report entry, keyed by (player id, season).
    pub fn upsert_injury(&self, update: &InjuryUpdate) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO injuries (player_id, season, team, status, detail, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT (player_id, season) DO UPDATE SET
                 team = excluded.team,
                 status = excluded.status,
                 detail = excluded.detail,
                 updated_at = excluded.updated_at",
            rusqlite::params![
                update.player_id,
                update.season,
                update.team,
                update.status,
                update.detail,
                now
            ],
        )?;
        Ok(())
    }

    pub fn game_count(&self) -> Result<u64> {
        self.count("games")
    }

    pub fn team_stats_count(&self) -> Result<u64> {
        self.count("game_team_stats")
    }

    pub fn injury_count(&self) -> Result<u64> {
        self.count("injuries")
    }

    fn count(&self, table: &str) -> Result<u64> {
        let db = self.db.lock().unwrap();
        // `table` is one of our own fixed names, never user input.
        let n: u64 = db.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })?;
        Ok(n)
    }
}

/// UTC bounds of a canonical-timezone calendar day, as RFC 3339 strings
/// comparable against the stored `game_date` column.
fn day_bounds_utc(day: NaiveDate) -> Result<(String, String)> {
    let bound = |d: NaiveDate| -> Result<String> {
        let midnight = d
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| naive.and_local_timezone(CANONICAL_TZ).single())
            .ok_or_else(|| StoreError::MalformedRow(format!("ambiguous local midnight: {d}")))?;
        Ok(midnight.with_timezone(&chrono::Utc).to_rfc3339())
    };
    Ok((bound(day)?, bound(day + Duration::days(1))?))
}
