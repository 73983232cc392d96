//! The sync pipeline: four ordered steps with isolated failures.
//!
//! Order is fixed — schedule/score sync, team stats, injuries, cache
//! invalidation last. A failing step is caught, logged, and recorded;
//! its siblings still run. Cancellation is observed between steps, so
//! `stop()` waits out at most one step, never a whole pipeline.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use gridline_core::season;

use crate::types::{GameDayInfo, SchedulerConfig, SyncStepResult};

/// Boxed error returned by step implementations.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

/// Inputs a step may need: what the detector saw this iteration.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub game_day: GameDayInfo,
}

/// One discrete unit of the sync pipeline.
///
/// Implementations talk to the upstream feed and storage; the pipeline
/// only cares about the name and whether the run succeeded. Every
/// external call inside a step must carry a bounded timeout.
#[async_trait]
pub trait SyncStep: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &StepContext) -> Result<(), StepError>;
}

/// Runs the configured steps strictly in order.
pub struct SyncPipeline {
    games: Box<dyn SyncStep>,
    stats: Box<dyn SyncStep>,
    injuries: Box<dyn SyncStep>,
    cache: Box<dyn SyncStep>,
    /// Canonical date of the last successful injury sync. Process
    /// memory only — a restart may re-run the same day, which the
    /// storage layer's idempotent upserts make harmless.
    last_injury_sync: Mutex<Option<NaiveDate>>,
}

impl SyncPipeline {
    pub fn new(
        games: Box<dyn SyncStep>,
        stats: Box<dyn SyncStep>,
        injuries: Box<dyn SyncStep>,
        cache: Box<dyn SyncStep>,
    ) -> Self {
        Self {
            games,
            stats,
            injuries,
            cache,
            last_injury_sync: Mutex::new(None),
        }
    }

    /// Execute one pass of the pipeline. Returns a result per executed
    /// step; skipped steps produce nothing.
    pub async fn run_iteration(
        &self,
        config: &SchedulerConfig,
        game_day: &GameDayInfo,
        now: DateTime<Utc>,
        cancel: &watch::Receiver<bool>,
    ) -> Vec<SyncStepResult> {
        let ctx = StepContext {
            game_day: *game_day,
        };
        let today = season::to_canonical(now).date_naive();
        let mut results = Vec::new();

        if config.sync_games {
            results.push(run_step(self.games.as_ref(), &ctx).await);
        }

        if *cancel.borrow() {
            return results;
        }
        // Stats only exist for completed games, and nothing completes
        // in the offseason.
        if config.sync_stats && game_day.is_active_season {
            results.push(run_step(self.stats.as_ref(), &ctx).await);
        }

        if *cancel.borrow() {
            return results;
        }
        if config.sync_injuries && self.injury_due(today) {
            let result = run_step(self.injuries.as_ref(), &ctx).await;
            if result.success {
                *self.last_injury_sync.lock().unwrap() = Some(today);
            }
            results.push(result);
        }

        if *cancel.borrow() {
            return results;
        }
        if config.clear_cache {
            results.push(run_step(self.cache.as_ref(), &ctx).await);
        }

        results
    }

    /// Once per canonical day, counted from the last *successful* run
    /// so a failed attempt doesn't burn the day's slot.
    fn injury_due(&self, today: NaiveDate) -> bool {
        *self.last_injury_sync.lock().unwrap() != Some(today)
    }
}

async fn run_step(step: &dyn SyncStep, ctx: &StepContext) -> SyncStepResult {
    let started = Instant::now();
    let outcome = step.run(ctx).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            info!(step = step.name(), duration_ms, "sync step completed");
            SyncStepResult {
                step_name: step.name().to_string(),
                success: true,
                error: None,
                duration_ms,
            }
        }
        Err(e) => {
            warn!(step = step.name(), duration_ms, error = %e, "sync step failed");
            SyncStepResult {
                step_name: step.name().to_string(),
                success: false,
                error: Some(e.to_string()),
                duration_ms,
            }
        }
    }
}
