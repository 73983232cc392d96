//! Upstream scoreboard feed client.
//!
//! `ScoreboardFeed` is the seam the sync steps talk through; `EspnFeed`
//! is the real HTTP implementation. Payload parsing is deliberately
//! shallow — only the fields the mirror stores are pulled out of the
//! upstream JSON, everything else is ignored.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use gridline_core::config::FeedSection;
use gridline_store::{GameStatus, GameUpdate, InjuryUpdate, TeamStatLine};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("malformed feed payload: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Read-only view of the upstream league data.
#[async_trait]
pub trait ScoreboardFeed: Send + Sync {
    /// Current scoreboard: every game in the active week with live
    /// scores and lifecycle status.
    async fn fetch_scoreboard(&self) -> Result<Vec<GameUpdate>>;

    /// Per-team box-score lines for one finished game.
    async fn fetch_game_stats(&self, espn_game_id: i64) -> Result<Vec<TeamStatLine>>;

    /// League-wide injury report for a season.
    async fn fetch_injuries(&self, season: i32) -> Result<Vec<InjuryUpdate>>;
}

/// ESPN site API client. Every request carries the configured timeout
/// so a hung upstream can never block scheduler shutdown.
pub struct EspnFeed {
    client: reqwest::Client,
    base_url: String,
}

impl EspnFeed {
    pub fn new(section: &FeedSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .user_agent(concat!("gridline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "feed request");
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl ScoreboardFeed for EspnFeed {
    async fn fetch_scoreboard(&self) -> Result<Vec<GameUpdate>> {
        let board: Scoreboard = self
            .get_json("/apis/site/v2/sports/football/nfl/scoreboard")
            .await?;
        board.events.iter().map(Event::to_update).collect()
    }

    async fn fetch_game_stats(&self, espn_game_id: i64) -> Result<Vec<TeamStatLine>> {
        let summary: GameSummary = self
            .get_json(&format!(
                "/apis/site/v2/sports/football/nfl/summary?event={espn_game_id}"
            ))
            .await?;
        Ok(summary
            .boxscore
            .teams
            .iter()
            .map(BoxscoreTeam::to_line)
            .collect())
    }

    async fn fetch_injuries(&self, season: i32) -> Result<Vec<InjuryUpdate>> {
        let report: InjuryReport = self
            .get_json("/apis/site/v2/sports/football/nfl/injuries")
            .await?;
        let mut out = Vec::new();
        for team in &report.injuries {
            for entry in &team.injuries {
                out.push(InjuryUpdate {
                    player_id: entry.athlete.id.clone(),
                    season,
                    team: team.display_name.clone(),
                    status: entry.status.to_lowercase().replace(' ', "_"),
                    detail: entry.short_comment.clone().unwrap_or_default(),
                });
            }
        }
        Ok(out)
    }
}

// ---- upstream payload models (fields the mirror needs, nothing more) ----

#[derive(Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct Event {
    id: String,
    date: String,
    season: SeasonRef,
    week: WeekRef,
    competitions: Vec<Competition>,
}

#[derive(Deserialize)]
struct SeasonRef {
    year: i32,
}

#[derive(Deserialize)]
struct WeekRef {
    number: u8,
}

#[derive(Deserialize)]
struct Competition {
    competitors: Vec<Competitor>,
    status: CompetitionStatus,
}

#[derive(Deserialize)]
struct Competitor {
    #[serde(rename = "homeAway")]
    home_away: String,
    #[serde(default)]
    score: String,
    team: TeamRef,
}

#[derive(Deserialize)]
struct TeamRef {
    abbreviation: String,
}

#[derive(Deserialize)]
struct CompetitionStatus {
    #[serde(rename = "type")]
    kind: StatusType,
}

#[derive(Deserialize)]
struct StatusType {
    state: String,
}

impl Event {
    fn to_update(&self) -> Result<GameUpdate> {
        let espn_game_id: i64 = self
            .id
            .parse()
            .map_err(|_| FeedError::Malformed(format!("non-numeric event id {:?}", self.id)))?;
        let competition = self
            .competitions
            .first()
            .ok_or_else(|| FeedError::Malformed(format!("event {} has no competition", self.id)))?;

        let side = |which: &str| -> Result<&Competitor> {
            competition
                .competitors
                .iter()
                .find(|c| c.home_away == which)
                .ok_or_else(|| {
                    FeedError::Malformed(format!("event {} missing {which} competitor", self.id))
                })
        };
        let home = side("home")?;
        let away = side("away")?;

        let status = match competition.status.kind.state.as_str() {
            "pre" => GameStatus::Scheduled,
            "in" => GameStatus::InProgress,
            "post" => GameStatus::Completed,
            other => {
                return Err(FeedError::Malformed(format!(
                    "event {} has unknown status state {other:?}",
                    self.id
                )))
            }
        };

        Ok(GameUpdate {
            espn_game_id,
            season: self.season.year,
            week: self.week.number,
            game_date: parse_event_date(&self.date)?,
            home_team: home.team.abbreviation.clone(),
            away_team: away.team.abbreviation.clone(),
            home_score: home.score.parse().unwrap_or(0),
            away_score: away.score.parse().unwrap_or(0),
            status,
        })
    }
}

/// The feed emits minute-precision UTC stamps like `2025-11-09T18:00Z`;
/// full RFC 3339 is accepted as well.
fn parse_event_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FeedError::Malformed(format!("bad event date {raw:?}: {e}")))
}

#[derive(Deserialize)]
struct GameSummary {
    boxscore: Boxscore,
}

#[derive(Deserialize)]
struct Boxscore {
    #[serde(default)]
    teams: Vec<BoxscoreTeam>,
}

#[derive(Deserialize)]
struct BoxscoreTeam {
    team: TeamRef,
    #[serde(default)]
    statistics: Vec<StatEntry>,
}

#[derive(Deserialize)]
struct StatEntry {
    name: String,
    #[serde(rename = "displayValue")]
    display_value: String,
}

impl BoxscoreTeam {
    fn to_line(&self) -> TeamStatLine {
        let stat = |name: &str| -> i32 {
            self.statistics
                .iter()
                .find(|s| s.name == name)
                .and_then(|s| s.display_value.parse().ok())
                .unwrap_or(0)
        };
        TeamStatLine {
            team: self.team.abbreviation.clone(),
            total_yards: stat("totalYards"),
            passing_yards: stat("netPassingYards"),
            rushing_yards: stat("rushingYards"),
            turnovers: stat("turnovers"),
        }
    }
}

#[derive(Deserialize)]
struct InjuryReport {
    #[serde(default)]
    injuries: Vec<TeamInjuries>,
}

#[derive(Deserialize)]
struct TeamInjuries {
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(default)]
    injuries: Vec<InjuryEntry>,
}

#[derive(Deserialize)]
struct InjuryEntry {
    athlete: AthleteRef,
    status: String,
    #[serde(rename = "shortComment")]
    short_comment: Option<String>,
}

#[derive(Deserialize)]
struct AthleteRef {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoreboard_event_maps_to_game_update() {
        let raw = serde_json::json!({
            "events": [{
                "id": "401547999",
                "date": "2025-11-09T18:00Z",
                "season": { "year": 2025 },
                "week": { "number": 10 },
                "competitions": [{
                    "competitors": [
                        { "homeAway": "home", "score": "21", "team": { "abbreviation": "KC" } },
                        { "homeAway": "away", "score": "17", "team": { "abbreviation": "BUF" } }
                    ],
                    "status": { "type": { "state": "in" } }
                }]
            }]
        });
        let board: Scoreboard = serde_json::from_value(raw).unwrap();
        let updates: Vec<GameUpdate> =
            board.events.iter().map(|e| e.to_update().unwrap()).collect();

        assert_eq!(updates.len(), 1);
        let g = &updates[0];
        assert_eq!(g.espn_game_id, 401547999);
        assert_eq!(g.season, 2025);
        assert_eq!(g.week, 10);
        assert_eq!(g.home_team, "KC");
        assert_eq!(g.away_team, "BUF");
        assert_eq!(g.home_score, 21);
        assert_eq!(g.away_score, 17);
        assert_eq!(g.status, GameStatus::InProgress);
        assert_eq!(g.game_date.to_rfc3339(), "2025-11-09T18:00:00+00:00");
    }

    #[test]
    fn unknown_status_state_is_rejected() {
        let raw = serde_json::json!({
            "id": "1", "date": "2025-11-09T18:00Z",
            "season": { "year": 2025 }, "week": { "number": 1 },
            "competitions": [{
                "competitors": [
                    { "homeAway": "home", "score": "0", "team": { "abbreviation": "A" } },
                    { "homeAway": "away", "score": "0", "team": { "abbreviation": "B" } }
                ],
                "status": { "type": { "state": "halftime?" } }
            }]
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert!(matches!(event.to_update(), Err(FeedError::Malformed(_))));
    }

    #[test]
    fn event_date_accepts_both_stamp_shapes() {
        assert!(parse_event_date("2025-11-09T18:00Z").is_ok());
        assert!(parse_event_date("2025-11-09T18:00:00+00:00").is_ok());
        assert!(parse_event_date("yesterday").is_err());
    }

    #[test]
    fn boxscore_stats_pull_named_fields() {
        let raw = serde_json::json!({
            "team": { "abbreviation": "KC" },
            "statistics": [
                { "name": "totalYards", "displayValue": "389" },
                { "name": "netPassingYards", "displayValue": "270" },
                { "name": "rushingYards", "displayValue": "119" },
                { "name": "turnovers", "displayValue": "1" },
                { "name": "possessionTime", "displayValue": "31:05" }
            ]
        });
        let team: BoxscoreTeam = serde_json::from_value(raw).unwrap();
        let line = team.to_line();
        assert_eq!(line.team, "KC");
        assert_eq!(line.total_yards, 389);
        assert_eq!(line.passing_yards, 270);
        assert_eq!(line.rushing_yards, 119);
        assert_eq!(line.turnovers, 1);
    }

    #[test]
    fn injury_report_flattens_team_groups() {
        let raw = serde_json::json!({
            "injuries": [{
                "displayName": "Kansas City Chiefs",
                "injuries": [
                    {
                        "athlete": { "id": "4241478" },
                        "status": "Questionable",
                        "shortComment": "ankle"
                    },
                    { "athlete": { "id": "3139477" }, "status": "Injured Reserve" }
                ]
            }]
        });
        let report: InjuryReport = serde_json::from_value(raw).unwrap();
        let mut out = Vec::new();
        for team in &report.injuries {
            for entry in &team.injuries {
                out.push((entry.athlete.id.clone(), entry.status.clone()));
            }
        }
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, "4241478");
    }
}
