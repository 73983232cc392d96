//! Game activity detection: a read-only look at today's schedule.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use gridline_core::season::{self, SeasonPhase};
use gridline_store::GameStore;

use crate::error::{Result, SchedulerError};
use crate::policy;
use crate::types::GameDayInfo;

/// Classifies the current instant against today's scheduled contests.
///
/// Purely read-only; zero games today is a normal result. A storage
/// failure is returned to the caller, which keeps its previous mode
/// and records the failure rather than crashing.
pub struct GameDetector {
    store: Arc<GameStore>,
}

impl GameDetector {
    pub fn new(store: Arc<GameStore>) -> Self {
        Self { store }
    }

    pub fn detect(&self, now: DateTime<Utc>) -> Result<GameDayInfo> {
        let local = season::to_canonical(now);
        let info = season::season_info(local);

        let summary = self
            .store
            .day_summary(local.date_naive())
            .map_err(|e| SchedulerError::Detection(e.to_string()))?;

        let in_window =
            policy::in_game_window(local, info.week, info.phase == SeasonPhase::Postseason);
        // A contest reported live overrides a closed window boundary.
        let is_game_time = in_window || summary.live > 0;

        let day = GameDayInfo {
            has_games_today: summary.total() > 0,
            is_game_time,
            live_count: summary.live,
            scheduled_count: summary.scheduled,
            completed_count: summary.completed,
            season_year: info.year,
            week: info.week,
            is_active_season: info.is_active(),
        };
        debug!(
            games = %day.summary(),
            game_time = day.is_game_time,
            season = day.season_year,
            week = day.week,
            "detected game-day state"
        );
        Ok(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gridline_store::{GameStatus, GameUpdate};
    use rusqlite::Connection;

    fn store_with(games: &[(i64, GameStatus)]) -> Arc<GameStore> {
        let store = GameStore::new(Connection::open_in_memory().unwrap()).unwrap();
        for &(id, status) in games {
            store
                .upsert_game(&GameUpdate {
                    espn_game_id: id,
                    season: 2025,
                    week: 9,
                    // Sunday 2025-11-02, 18:00 UTC = 13:00 Eastern.
                    game_date: Utc.with_ymd_and_hms(2025, 11, 2, 18, 0, 0).unwrap(),
                    home_team: "KC".into(),
                    away_team: "BUF".into(),
                    home_score: 0,
                    away_score: 0,
                    status,
                })
                .unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn zero_games_today_is_normal() {
        let detector = GameDetector::new(store_with(&[]));
        // A Tuesday during the season.
        let now = Utc.with_ymd_and_hms(2025, 11, 4, 19, 0, 0).unwrap();
        let info = detector.detect(now).unwrap();
        assert!(!info.has_games_today);
        assert!(!info.is_game_time);
        assert!(info.is_active_season);
    }

    #[test]
    fn live_game_overrides_closed_window() {
        let detector = GameDetector::new(store_with(&[(1, GameStatus::InProgress)]));
        // Sunday 9:00 ET — before the 1pm window, but a game ran long
        // or started oddly and is still live.
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 14, 0, 0).unwrap();
        let info = detector.detect(now).unwrap();
        assert!(info.is_game_time);
        assert_eq!(info.live_count, 1);
    }

    #[test]
    fn game_day_inside_window_is_game_time() {
        let detector = GameDetector::new(store_with(&[(1, GameStatus::Scheduled)]));
        // Sunday 14:00 ET.
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 19, 0, 0).unwrap();
        let info = detector.detect(now).unwrap();
        assert!(info.has_games_today);
        assert!(info.is_game_time);
    }

    #[test]
    fn detection_drives_the_expected_modes() {
        use crate::types::SyncMode;

        let mode_at = |detector: &GameDetector, now: DateTime<Utc>| {
            let info = detector.detect(now).unwrap();
            policy::decide_mode(info.is_active_season, info.has_games_today, info.is_game_time)
        };

        // Sunday 14:00 ET with games in progress.
        let live = GameDetector::new(store_with(&[(1, GameStatus::InProgress)]));
        let sunday_2pm = Utc.with_ymd_and_hms(2025, 11, 2, 19, 0, 0).unwrap();
        assert_eq!(mode_at(&live, sunday_2pm), SyncMode::Live);

        // Same Sunday morning, games only scheduled: game day, window closed.
        let pregame = GameDetector::new(store_with(&[(1, GameStatus::Scheduled)]));
        let sunday_9am = Utc.with_ymd_and_hms(2025, 11, 2, 14, 0, 0).unwrap();
        assert_eq!(mode_at(&pregame, sunday_9am), SyncMode::Active);

        // A Tuesday in season with nothing today.
        let quiet = GameDetector::new(store_with(&[]));
        let tuesday = Utc.with_ymd_and_hms(2025, 11, 4, 19, 0, 0).unwrap();
        assert_eq!(mode_at(&quiet, tuesday), SyncMode::Standard);

        // Mid-March: offseason regardless of the stored schedule.
        let march = Utc.with_ymd_and_hms(2026, 3, 15, 19, 0, 0).unwrap();
        assert_eq!(mode_at(&quiet, march), SyncMode::Idle);
    }

    #[test]
    fn storage_failure_surfaces_as_detection_error() {
        let path = std::env::temp_dir().join(format!(
            "gridline-detector-test-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = GameStore::new(Connection::open(&path).unwrap()).unwrap();
        let detector = GameDetector::new(Arc::new(store));
        // Drop the table out from under the detector via a second
        // connection to the same file.
        Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE games;")
            .unwrap();

        let now = Utc.with_ymd_and_hms(2025, 11, 4, 19, 0, 0).unwrap();
        let err = detector.detect(now).unwrap_err();
        assert!(matches!(err, SchedulerError::Detection(_)));
        let _ = std::fs::remove_file(&path);
    }
}
