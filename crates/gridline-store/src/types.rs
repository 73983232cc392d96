use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(GameStatus::Scheduled),
            "in_progress" => Ok(GameStatus::InProgress),
            "completed" => Ok(GameStatus::Completed),
            other => Err(format!("unknown game status: {other}")),
        }
    }
}

/// One contest as reported by the upstream feed — the upsert payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameUpdate {
    /// Upstream game id — the natural key for the upsert.
    pub espn_game_id: i64,
    pub season: i32,
    pub week: u8,
    /// Kickoff instant (UTC); bucketed into canonical-timezone days by queries.
    pub game_date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i32,
    pub away_score: i32,
    pub status: GameStatus,
}

/// Today's contests bucketed by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub scheduled: u32,
    pub live: u32,
    pub completed: u32,
}

impl DaySummary {
    pub fn total(&self) -> u32 {
        self.scheduled + self.live + self.completed
    }
}

/// One team's box-score line for a completed game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStatLine {
    pub team: String,
    pub total_yards: i32,
    pub passing_yards: i32,
    pub rushing_yards: i32,
    pub turnovers: i32,
}

/// One player's injury report entry. Keyed by (player id, season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryUpdate {
    pub player_id: String,
    pub season: i32,
    pub team: String,
    /// e.g. "questionable", "out", "injured_reserve".
    pub status: String,
    pub detail: String,
}
