//! Scheduler engine: one background loop, one shared status cell.
//!
//! The loop is the single writer of [`SchedulerStatus`]; the cloneable
//! [`Scheduler`] handle is the concurrency-safe surface operators use.
//! Readers always get a copied snapshot, writes always replace the
//! whole snapshot, so a torn read is impossible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gridline_core::season;

use crate::detector::GameDetector;
use crate::error::{Result, SchedulerError};
use crate::pipeline::SyncPipeline;
use crate::policy;
use crate::types::{SchedulerConfig, SchedulerStatus};

struct SchedulerInner {
    detector: GameDetector,
    pipeline: SyncPipeline,
    config: Mutex<SchedulerConfig>,
    status: Mutex<SchedulerStatus>,
    /// Guards against a second loop. Exactly one runs per process.
    running: AtomicBool,
    /// Single-slot manual trigger latch: set by `trigger_now`, cleared
    /// by the loop when it consumes the wake-up. While set, further
    /// triggers are rejected, so at most one extra iteration is owed.
    trigger_pending: AtomicBool,
    trigger: Notify,
    /// Wakes the sleeping loop after `update_config` so an interval
    /// change takes effect without waiting out the old interval.
    config_changed: Notify,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the adaptive sync scheduler. Cheap to clone; all clones
/// share the same loop and state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, detector: GameDetector, pipeline: SyncPipeline) -> Self {
        let (shutdown, _) = watch::channel(false);
        let season_label = season::season_info(season::to_canonical(Utc::now())).label();
        let status = SchedulerStatus::initial(&config, season_label);

        Self {
            inner: Arc::new(SchedulerInner {
                detector,
                pipeline,
                config: Mutex::new(config),
                status: Mutex::new(status),
                running: AtomicBool::new(false),
                trigger_pending: AtomicBool::new(false),
                trigger: Notify::new(),
                config_changed: Notify::new(),
                shutdown,
                task: Mutex::new(None),
            }),
        }
    }

    /// Spawn the background loop. The first iteration runs immediately,
    /// before the first wait. Calling while already running is a no-op
    /// with a logged warning.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            warn!("scheduler already running; start ignored");
            return;
        }
        // Reset the cancellation flag in case this is a restart.
        let _ = self.inner.shutdown.send(false);
        info!("starting adaptive sync scheduler");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { run_loop(inner).await });
        *self.inner.task.lock().unwrap() = Some(task);
    }

    /// Signal cancellation and wait for the in-flight iteration to
    /// finish. Never interrupts a step mid-execution. No-op when the
    /// loop is already stopped.
    pub async fn stop(&self) {
        if !self.inner.running.load(Ordering::SeqCst) {
            return;
        }
        info!("stopping scheduler");
        let _ = self.inner.shutdown.send(true);

        let task = self.inner.task.lock().unwrap().take();
        if let Some(task) = task {
            let _ = task.await;
        }

        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.trigger_pending.store(false, Ordering::SeqCst);
        {
            let mut status = self.inner.status.lock().unwrap();
            status.running = false;
            status.next_sync_at = None;
        }
        info!("scheduler stopped");
    }

    /// Request one out-of-band iteration. Non-blocking: the iteration
    /// runs asynchronously on the loop task. A second trigger while one
    /// is pending is dropped with `AlreadyTriggering`.
    pub fn trigger_now(&self) -> Result<()> {
        if !self.inner.running.load(Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }
        if self.inner.trigger_pending.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyTriggering);
        }
        info!("manual sync requested");
        self.inner.trigger.notify_one();
        Ok(())
    }

    /// Merge a partial config update. Validation happens before any
    /// field is applied; invalid payloads leave the prior configuration
    /// untouched. If the active mode's interval changed, the sleeping
    /// loop re-arms immediately.
    pub fn update_config(&self, update: &crate::types::ConfigUpdate) -> Result<SchedulerConfig> {
        let snapshot = {
            let mut config = self.inner.config.lock().unwrap();
            config.apply(update)?;
            config.clone()
        };
        info!(
            enabled = snapshot.enabled,
            mode_override = ?snapshot.mode_override,
            "scheduler configuration updated"
        );
        self.inner.config_changed.notify_one();
        Ok(snapshot)
    }

    /// Copied status snapshot. Safe to call from any task at any time.
    pub fn status(&self) -> SchedulerStatus {
        self.inner.status.lock().unwrap().clone()
    }
}

async fn run_loop(inner: Arc<SchedulerInner>) {
    let mut shutdown = inner.shutdown.subscribe();

    // Immediate first iteration before the first wait.
    let mut interval = run_iteration(&inner).await;

    'armed: loop {
        let armed_at = tokio::time::Instant::now();
        let mut current_interval = interval;
        let sleep = tokio::time::sleep_until(armed_at + current_interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => {
                    interval = run_iteration(&inner).await;
                    continue 'armed;
                }
                _ = inner.trigger.notified() => {
                    inner.trigger_pending.store(false, Ordering::SeqCst);
                    info!("manual sync trigger received");
                    interval = run_iteration(&inner).await;
                    continue 'armed;
                }
                _ = inner.config_changed.notified() => {
                    // The active mode's interval may have changed —
                    // re-arm relative to when this wait started.
                    let mode = inner.status.lock().unwrap().current_mode;
                    let updated = inner.config.lock().unwrap().interval(mode);
                    if updated != current_interval {
                        info!(secs = updated.as_secs(), "interval changed; re-arming timer");
                        current_interval = updated;
                        sleep.as_mut().reset(armed_at + current_interval);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scheduler loop shutting down");
                        return;
                    }
                }
            }
        }
    }
}

/// One full iteration: detect, decide, run the pipeline, publish a
/// fresh status snapshot. Returns the interval to wait before the next
/// naturally scheduled iteration.
///
/// There is no fatal iteration error — detection and step failures are
/// recorded in the snapshot and the loop always re-arms.
async fn run_iteration(inner: &Arc<SchedulerInner>) -> Duration {
    let config = inner.config.lock().unwrap().clone();
    let now = Utc::now();
    let prev_mode = inner.status.lock().unwrap().current_mode;

    if !config.enabled {
        debug!("sync skipped (scheduler disabled)");
        let interval = config.interval(prev_mode);
        let mut status = inner.status.lock().unwrap();
        status.enabled = false;
        status.running = true;
        status.next_sync_at = next_sync_at(now, interval);
        status.interval_secs = interval.as_secs();
        return interval;
    }

    let started = std::time::Instant::now();
    let mut last_error: Option<String> = None;

    let (mode, game_day) = match inner.detector.detect(now) {
        Ok(info) => {
            let decided = config.mode_override.unwrap_or_else(|| {
                policy::decide_mode(info.is_active_season, info.has_games_today, info.is_game_time)
            });
            (decided, Some(info))
        }
        Err(e) => {
            // Non-fatal: keep the previous mode, record the failure.
            warn!(error = %e, "game detection failed; retaining previous mode");
            last_error = Some(e.to_string());
            (prev_mode, None)
        }
    };

    if mode != prev_mode {
        info!(from = %prev_mode, to = %mode, "sync mode changed");
    }

    if let Some(ref day) = game_day {
        let cancel = inner.shutdown.subscribe();
        let results = inner
            .pipeline
            .run_iteration(&config, day, now, &cancel)
            .await;
        if last_error.is_none() {
            last_error = results
                .iter()
                .find(|r| !r.success)
                .map(|r| {
                    format!(
                        "{} failed: {}",
                        r.step_name,
                        r.error.as_deref().unwrap_or("unknown error")
                    )
                });
        }
    }

    let interval = config.interval(mode);
    let failed = last_error.is_some();
    let season_label = season::season_info(season::to_canonical(now)).label();

    {
        let mut status = inner.status.lock().unwrap();
        let sync_count = status.sync_count + 1;
        let error_count = status.error_count + u64::from(failed);
        // Whole-snapshot replacement: readers can never observe a
        // half-updated status.
        *status = SchedulerStatus {
            enabled: config.enabled,
            running: true,
            current_mode: mode,
            next_sync_at: next_sync_at(now, interval),
            last_sync_at: Some(now),
            last_error,
            sync_count,
            error_count,
            interval_secs: interval.as_secs(),
            season_info: season_label,
            games_summary: game_day.as_ref().map(|d| d.summary()),
        };
    }

    info!(
        mode = %mode,
        ok = !failed,
        duration_ms = started.elapsed().as_millis() as u64,
        next_in_secs = interval.as_secs(),
        "sync iteration finished"
    );
    interval
}

fn next_sync_at(
    now: chrono::DateTime<Utc>,
    interval: Duration,
) -> Option<chrono::DateTime<Utc>> {
    chrono::Duration::from_std(interval)
        .ok()
        .map(|d| now + d)
}
