//! Concrete pipeline steps: upstream feed → storage upserts.
//!
//! Each step is small and independent; failures surface through the
//! boxed step error and never take a sibling down with them. All
//! writes go through the store's idempotent upserts, so re-running a
//! step after a partial failure is always safe.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use gridline_scheduler::{StepContext, StepError, SyncStep};
use gridline_store::{GameStore, ResponseCache};

use crate::feed::ScoreboardFeed;

/// Pull the current scoreboard and upsert every game. Skipped in the
/// offseason — the feed serves stale content then and there is nothing
/// to mirror.
pub struct GamesSyncStep {
    feed: Arc<dyn ScoreboardFeed>,
    store: Arc<GameStore>,
}

impl GamesSyncStep {
    pub fn new(feed: Arc<dyn ScoreboardFeed>, store: Arc<GameStore>) -> Self {
        Self { feed, store }
    }
}

#[async_trait]
impl SyncStep for GamesSyncStep {
    fn name(&self) -> &'static str {
        "games"
    }

    async fn run(&self, ctx: &StepContext) -> Result<(), StepError> {
        if !ctx.game_day.is_active_season {
            debug!("offseason; scoreboard sync skipped");
            return Ok(());
        }
        let updates = self.feed.fetch_scoreboard().await?;
        for update in &updates {
            self.store.upsert_game(update)?;
        }
        info!(games = updates.len(), "scoreboard synced");
        Ok(())
    }
}

/// Backfill box scores for completed games that have none yet.
/// Finding nothing to do is the normal case and counts as success.
pub struct TeamStatsSyncStep {
    feed: Arc<dyn ScoreboardFeed>,
    store: Arc<GameStore>,
}

impl TeamStatsSyncStep {
    pub fn new(feed: Arc<dyn ScoreboardFeed>, store: Arc<GameStore>) -> Self {
        Self { feed, store }
    }
}

#[async_trait]
impl SyncStep for TeamStatsSyncStep {
    fn name(&self) -> &'static str {
        "team_stats"
    }

    async fn run(&self, ctx: &StepContext) -> Result<(), StepError> {
        let day = &ctx.game_day;
        let pending = self
            .store
            .completed_without_stats(day.season_year, day.week)?;
        if pending.is_empty() {
            debug!("no completed games missing stats");
            return Ok(());
        }
        for game in &pending {
            let lines = self.feed.fetch_game_stats(game.espn_game_id).await?;
            for line in &lines {
                self.store.upsert_team_stats(&game.id, line)?;
            }
        }
        info!(games = pending.len(), "team stats backfilled");
        Ok(())
    }
}

/// Mirror the league injury report. The pipeline's once-per-day gate
/// decides when this runs; the step itself just fetches and upserts.
pub struct InjurySyncStep {
    feed: Arc<dyn ScoreboardFeed>,
    store: Arc<GameStore>,
}

impl InjurySyncStep {
    pub fn new(feed: Arc<dyn ScoreboardFeed>, store: Arc<GameStore>) -> Self {
        Self { feed, store }
    }
}

#[async_trait]
impl SyncStep for InjurySyncStep {
    fn name(&self) -> &'static str {
        "injuries"
    }

    async fn run(&self, ctx: &StepContext) -> Result<(), StepError> {
        let updates = self.feed.fetch_injuries(ctx.game_day.season_year).await?;
        for update in &updates {
            self.store.upsert_injury(update)?;
        }
        info!(entries = updates.len(), "injury report synced");
        Ok(())
    }
}

/// Drop cached responses whose underlying data this iteration may have
/// changed. Targeted domain patterns only — never a full cache flush.
pub struct CacheClearStep {
    cache: Arc<ResponseCache>,
}

impl CacheClearStep {
    pub const PATTERNS: [&'static str; 6] = [
        "games:*",
        "game:*",
        "teams:*",
        "team:*",
        "stats:*",
        "standings:*",
    ];

    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl SyncStep for CacheClearStep {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn run(&self, _ctx: &StepContext) -> Result<(), StepError> {
        let removed = self.cache.invalidate(&Self::PATTERNS);
        debug!(removed, "stale cached responses dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedError, Result as FeedResult};
    use chrono::{TimeZone, Utc};
    use gridline_scheduler::GameDayInfo;
    use gridline_store::{GameStatus, GameUpdate, InjuryUpdate, TeamStatLine};
    use rusqlite::Connection;

    struct CannedFeed {
        games: Vec<GameUpdate>,
        stats: Vec<TeamStatLine>,
        injuries: Vec<InjuryUpdate>,
        fail: bool,
    }

    #[async_trait]
    impl ScoreboardFeed for CannedFeed {
        async fn fetch_scoreboard(&self) -> FeedResult<Vec<GameUpdate>> {
            if self.fail {
                return Err(FeedError::Status(503));
            }
            Ok(self.games.clone())
        }
        async fn fetch_game_stats(&self, _espn_game_id: i64) -> FeedResult<Vec<TeamStatLine>> {
            Ok(self.stats.clone())
        }
        async fn fetch_injuries(&self, _season: i32) -> FeedResult<Vec<InjuryUpdate>> {
            Ok(self.injuries.clone())
        }
    }

    fn game(espn_game_id: i64, status: GameStatus) -> GameUpdate {
        GameUpdate {
            espn_game_id,
            season: 2025,
            week: 10,
            game_date: Utc.with_ymd_and_hms(2025, 11, 9, 18, 0, 0).unwrap(),
            home_team: "KC".into(),
            away_team: "BUF".into(),
            home_score: 21,
            away_score: 17,
            status,
        }
    }

    fn in_season_ctx() -> StepContext {
        StepContext {
            game_day: GameDayInfo {
                has_games_today: true,
                is_game_time: true,
                live_count: 1,
                scheduled_count: 0,
                completed_count: 0,
                season_year: 2025,
                week: 10,
                is_active_season: true,
            },
        }
    }

    fn store() -> Arc<GameStore> {
        Arc::new(GameStore::new(Connection::open_in_memory().unwrap()).unwrap())
    }

    #[tokio::test]
    async fn games_step_upserts_the_scoreboard() {
        let store = store();
        let feed = Arc::new(CannedFeed {
            games: vec![game(1, GameStatus::InProgress), game(2, GameStatus::Scheduled)],
            stats: vec![],
            injuries: vec![],
            fail: false,
        });
        let step = GamesSyncStep::new(feed, Arc::clone(&store));

        step.run(&in_season_ctx()).await.unwrap();
        assert_eq!(store.game_count().unwrap(), 2);

        // rerun is idempotent
        step.run(&in_season_ctx()).await.unwrap();
        assert_eq!(store.game_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn games_step_skips_the_offseason() {
        let store = store();
        let feed = Arc::new(CannedFeed {
            // would fail if fetched — proves we never reach the feed
            games: vec![],
            stats: vec![],
            injuries: vec![],
            fail: true,
        });
        let step = GamesSyncStep::new(feed, Arc::clone(&store));

        let mut ctx = in_season_ctx();
        ctx.game_day.is_active_season = false;
        step.run(&ctx).await.unwrap();
        assert_eq!(store.game_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn games_step_surfaces_feed_failure() {
        let feed = Arc::new(CannedFeed {
            games: vec![],
            stats: vec![],
            injuries: vec![],
            fail: true,
        });
        let step = GamesSyncStep::new(feed, store());
        assert!(step.run(&in_season_ctx()).await.is_err());
    }

    #[tokio::test]
    async fn stats_step_backfills_only_missing_games() {
        let store = store();
        store.upsert_game(&game(1, GameStatus::Completed)).unwrap();
        let feed = Arc::new(CannedFeed {
            games: vec![],
            stats: vec![
                TeamStatLine {
                    team: "KC".into(),
                    total_yards: 389,
                    passing_yards: 270,
                    rushing_yards: 119,
                    turnovers: 1,
                },
                TeamStatLine {
                    team: "BUF".into(),
                    total_yards: 344,
                    passing_yards: 256,
                    rushing_yards: 88,
                    turnovers: 2,
                },
            ],
            injuries: vec![],
            fail: false,
        });
        let step = TeamStatsSyncStep::new(feed, Arc::clone(&store));

        step.run(&in_season_ctx()).await.unwrap();
        assert_eq!(store.team_stats_count().unwrap(), 2);

        // second pass finds nothing pending and still succeeds
        step.run(&in_season_ctx()).await.unwrap();
        assert_eq!(store.team_stats_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn stats_step_with_nothing_pending_is_success() {
        let step = TeamStatsSyncStep::new(
            Arc::new(CannedFeed {
                games: vec![],
                stats: vec![],
                injuries: vec![],
                fail: false,
            }),
            store(),
        );
        assert!(step.run(&in_season_ctx()).await.is_ok());
    }

    #[tokio::test]
    async fn injury_step_upserts_the_report() {
        let store = store();
        let feed = Arc::new(CannedFeed {
            games: vec![],
            stats: vec![],
            injuries: vec![InjuryUpdate {
                player_id: "4241478".into(),
                season: 2025,
                team: "KC".into(),
                status: "questionable".into(),
                detail: "ankle".into(),
            }],
            fail: false,
        });
        let step = InjurySyncStep::new(feed, Arc::clone(&store));

        step.run(&in_season_ctx()).await.unwrap();
        step.run(&in_season_ctx()).await.unwrap();
        assert_eq!(store.injury_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn cache_step_drops_domain_keys_only() {
        let cache = Arc::new(ResponseCache::new(std::time::Duration::from_secs(300)));
        cache.put("games:2025:10", "[]".to_string());
        cache.put("team:KC", "{}".to_string());
        cache.put("players:all", "[]".to_string());

        let step = CacheClearStep::new(Arc::clone(&cache));
        step.run(&in_season_ctx()).await.unwrap();

        assert!(cache.get("games:2025:10").is_none());
        assert!(cache.get("team:KC").is_none());
        assert!(cache.get("players:all").is_some());
    }
}
