//! Mode policy: pure decisions, no clocks and no storage.
//!
//! The weekly kickoff windows are fixed Eastern-time ranges,
//! start-inclusive and end-exclusive. A contest the detector reports as
//! live overrides a closed window — that check lives in the detector,
//! which ORs the live count into `is_game_time`.

use chrono::{DateTime, Datelike, Timelike, Weekday};
use chrono_tz::Tz;

use gridline_core::season::SATURDAY_GAMES_FROM_WEEK;

use crate::types::SyncMode;

/// Pick the operating tempo. Strict priority order:
/// offseason beats everything, then live beats active, and a
/// quiet in-season day falls through to standard.
pub fn decide_mode(season_active: bool, has_games_today: bool, is_game_time: bool) -> SyncMode {
    if !season_active {
        return SyncMode::Idle;
    }
    if has_games_today {
        if is_game_time {
            return SyncMode::Live;
        }
        return SyncMode::Active;
    }
    SyncMode::Standard
}

/// Is the canonical wall-clock inside a kickoff window?
///
/// Sunday afternoons plus Thursday and Monday nights are the core
/// windows; Saturday joins them late in the season once the schedule
/// moves games there, and stays open through the playoffs.
pub fn in_game_window(local: DateTime<Tz>, week: u8, postseason: bool) -> bool {
    let minutes = local.hour() * 60 + local.minute();
    match local.weekday() {
        // First kickoffs at 1pm ET through the end of Sunday Night Football.
        Weekday::Sun => minutes >= 13 * 60,
        // Thursday Night Football.
        Weekday::Thu => minutes >= 20 * 60,
        // Monday Night Football.
        Weekday::Mon => minutes >= 20 * 60,
        Weekday::Sat => {
            if week >= SATURDAY_GAMES_FROM_WEEK || postseason {
                minutes >= 13 * 60
            } else {
                false
            }
        }
        _ => false,
    }
}
