//! NFL season calendar, pinned to one canonical timezone.
//!
//! Every wall-clock comparison in the workspace goes through
//! [`to_canonical`] — deploying the process in another region must not
//! change which games count as "today" or whether a kickoff window is
//! open.
//!
//! The season spans early September through early February. Weeks are
//! Thursday-anchored: week 1 begins the first Thursday of September and
//! each subsequent week rolls over on Thursday, not Monday.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// All schedule decisions are made in US Eastern time.
pub const CANONICAL_TZ: Tz = chrono_tz::America::New_York;

/// The last regular-season week; playoff weeks run 19..=22.
pub const LAST_REGULAR_WEEK: u8 = 18;

/// Saturday games only exist from this week onward.
pub const SATURDAY_GAMES_FROM_WEEK: u8 = 15;

/// Convert a UTC instant to the canonical wall clock.
pub fn to_canonical(utc: DateTime<Utc>) -> DateTime<Tz> {
    utc.with_timezone(&CANONICAL_TZ)
}

/// Phase of the NFL calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    Offseason,
    Preseason,
    Regular,
    Postseason,
}

/// Season year, week number, and phase for a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonInfo {
    /// Season year is the year the season *starts* in: the 2024 season
    /// runs September 2024 through February 2025.
    pub year: i32,
    /// 1..=18 regular season, 19..=22 playoffs, 0 outside the season.
    pub week: u8,
    pub phase: SeasonPhase,
}

impl SeasonInfo {
    pub fn is_active(&self) -> bool {
        self.phase != SeasonPhase::Offseason
    }

    /// Human-readable label for status output, e.g. "Season 2025, Week 8 (Regular Season)".
    pub fn label(&self) -> String {
        let phase = match self.phase {
            SeasonPhase::Offseason => "Offseason",
            SeasonPhase::Preseason => "Preseason",
            SeasonPhase::Regular => "Regular Season",
            SeasonPhase::Postseason => "Postseason",
        };
        format!("Season {}, Week {} ({})", self.year, self.week, phase)
    }
}

/// Classify a canonical-time instant against the season calendar.
pub fn season_info(local: DateTime<Tz>) -> SeasonInfo {
    let year = local.year();
    let month = local.month();
    let day = local.day();
    let date = local.date_naive();

    match month {
        9..=12 => {
            if month == 9 && day < 5 {
                // Kickoff hasn't happened yet in the first days of September.
                SeasonInfo {
                    year,
                    week: 0,
                    phase: SeasonPhase::Preseason,
                }
            } else {
                SeasonInfo {
                    year,
                    week: week_for(year, date),
                    phase: SeasonPhase::Regular,
                }
            }
        }
        1 => {
            // January belongs to the previous year's season: late regular
            // season weeks or the playoffs, depending on the week count.
            let season_year = year - 1;
            let week = week_for(season_year, date);
            let phase = if week <= LAST_REGULAR_WEEK {
                SeasonPhase::Regular
            } else {
                SeasonPhase::Postseason
            };
            SeasonInfo {
                year: season_year,
                week,
                phase,
            }
        }
        2 if day <= 15 => SeasonInfo {
            // Super Bowl window.
            year: year - 1,
            week: 22,
            phase: SeasonPhase::Postseason,
        },
        2 => SeasonInfo {
            year: year - 1,
            week: 0,
            phase: SeasonPhase::Offseason,
        },
        _ => SeasonInfo {
            year,
            week: 0,
            phase: SeasonPhase::Offseason,
        },
    }
}

/// First Thursday of September — week 1 starts here.
fn season_start(season_year: i32) -> NaiveDate {
    let mut d = NaiveDate::from_ymd_opt(season_year, 9, 1).unwrap_or_default();
    while d.weekday() != Weekday::Thu {
        d = d.succ_opt().unwrap_or(d);
    }
    d
}

/// Week number for a date within a season, clamped to 1..=22.
fn week_for(season_year: i32, date: NaiveDate) -> u8 {
    let start = season_start(season_year);
    let days = (date - start).num_days();
    let week = days.div_euclid(7) + 1;
    week.clamp(1, 22) as u8
}
