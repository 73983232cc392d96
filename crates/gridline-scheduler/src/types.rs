use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gridline_core::config::SchedulerSection;

use crate::error::{Result, SchedulerError};

/// The scheduler's operating tempo, ordered by descending refresh
/// frequency. Closed set — invalid modes are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Games in progress or inside a kickoff window.
    Live,
    /// Game day, outside the windows.
    Active,
    /// In season, no games today.
    Standard,
    /// Offseason.
    Idle,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncMode::Live => "live",
            SyncMode::Active => "active",
            SyncMode::Standard => "standard",
            SyncMode::Idle => "idle",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "live" => Ok(SyncMode::Live),
            "active" => Ok(SyncMode::Active),
            "standard" => Ok(SyncMode::Standard),
            "idle" => Ok(SyncMode::Idle),
            other => Err(format!("unknown sync mode: {other}")),
        }
    }
}

/// Runtime scheduler configuration.
///
/// Constructed once from the config file at process start; afterwards
/// mutated only through [`SchedulerConfig::apply`] under the engine's
/// config lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// When false, iterations are skipped (the loop keeps ticking so a
    /// later `enabled = true` resumes without a restart).
    pub enabled: bool,
    /// Forces a mode, bypassing the policy, until cleared with "auto".
    pub mode_override: Option<SyncMode>,
    pub live_interval: Duration,
    pub active_interval: Duration,
    pub standard_interval: Duration,
    pub idle_interval: Duration,
    pub sync_games: bool,
    pub sync_stats: bool,
    pub sync_injuries: bool,
    pub clear_cache: bool,
}

impl SchedulerConfig {
    pub fn from_section(section: &SchedulerSection) -> Self {
        Self {
            enabled: section.enabled,
            mode_override: None,
            live_interval: Duration::from_secs(section.live_interval_secs),
            active_interval: Duration::from_secs(section.active_interval_secs),
            standard_interval: Duration::from_secs(section.standard_interval_secs),
            idle_interval: Duration::from_secs(section.idle_interval_secs),
            sync_games: section.sync_games,
            sync_stats: section.sync_stats,
            sync_injuries: section.sync_injuries,
            clear_cache: section.clear_cache,
        }
    }

    /// Refresh interval for a mode. Exhaustive by construction.
    pub fn interval(&self, mode: SyncMode) -> Duration {
        match mode {
            SyncMode::Live => self.live_interval,
            SyncMode::Active => self.active_interval,
            SyncMode::Standard => self.standard_interval,
            SyncMode::Idle => self.idle_interval,
        }
    }

    /// Merge a partial update, validating every field before any of
    /// them is applied. On error the config is left untouched.
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<()> {
        let mut next = self.clone();

        if let Some(enabled) = update.enabled {
            next.enabled = enabled;
        }
        if let Some(ref mode) = update.mode {
            next.mode_override = match mode.as_str() {
                "auto" | "" => None,
                other => Some(other.parse().map_err(SchedulerError::Config)?),
            };
        }
        for (slot, secs) in [
            (&mut next.live_interval, update.live_interval_secs),
            (&mut next.active_interval, update.active_interval_secs),
            (&mut next.standard_interval, update.standard_interval_secs),
            (&mut next.idle_interval, update.idle_interval_secs),
        ] {
            if let Some(secs) = secs {
                if secs == 0 {
                    return Err(SchedulerError::Config(
                        "intervals must be positive".to_string(),
                    ));
                }
                *slot = Duration::from_secs(secs);
            }
        }
        if let Some(v) = update.sync_games {
            next.sync_games = v;
        }
        if let Some(v) = update.sync_stats {
            next.sync_stats = v;
        }
        if let Some(v) = update.sync_injuries {
            next.sync_injuries = v;
        }
        if let Some(v) = update.clear_cache {
            next.clear_cache = v;
        }

        *self = next;
        Ok(())
    }
}

/// Partial configuration update — only explicitly-provided fields are
/// merged. Matches the admin API's JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigUpdate {
    pub enabled: Option<bool>,
    /// A mode name to force, or "auto" to return to policy control.
    pub mode: Option<String>,
    pub live_interval_secs: Option<u64>,
    pub active_interval_secs: Option<u64>,
    pub standard_interval_secs: Option<u64>,
    pub idle_interval_secs: Option<u64>,
    pub sync_games: Option<bool>,
    pub sync_stats: Option<bool>,
    pub sync_injuries: Option<bool>,
    pub clear_cache: Option<bool>,
}

/// What the detector found out about today. Produced fresh each
/// iteration, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameDayInfo {
    pub has_games_today: bool,
    /// Inside a kickoff window, or a contest is live right now.
    pub is_game_time: bool,
    pub live_count: u32,
    pub scheduled_count: u32,
    pub completed_count: u32,
    pub season_year: i32,
    pub week: u8,
    pub is_active_season: bool,
}

impl GameDayInfo {
    /// One-line summary for logs and the status snapshot.
    pub fn summary(&self) -> String {
        format!(
            "{} total ({} live, {} scheduled, {} completed)",
            self.live_count + self.scheduled_count + self.completed_count,
            self.live_count,
            self.scheduled_count,
            self.completed_count
        )
    }
}

/// Immutable status snapshot, rebuilt after every iteration. Readers
/// always receive a copy — never a reference into the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub running: bool,
    pub current_mode: SyncMode,
    pub next_sync_at: Option<DateTime<Utc>>,
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub sync_count: u64,
    pub error_count: u64,
    pub interval_secs: u64,
    pub season_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games_summary: Option<String>,
}

impl SchedulerStatus {
    /// Snapshot shown before the first iteration has run.
    pub fn initial(config: &SchedulerConfig, season_info: String) -> Self {
        Self {
            enabled: config.enabled,
            running: false,
            current_mode: SyncMode::Standard,
            next_sync_at: None,
            last_sync_at: None,
            last_error: None,
            sync_count: 0,
            error_count: 0,
            interval_secs: config.standard_interval.as_secs(),
            season_info,
            games_summary: None,
        }
    }
}

/// Outcome of one executed pipeline step. Consumed for logging and
/// status only — never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStepResult {
    pub step_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}
