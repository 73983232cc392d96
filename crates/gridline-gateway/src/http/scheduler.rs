//! Scheduler admin endpoints.
//!
//! - `GET  /v1/scheduler/status` — current status snapshot
//! - `POST /v1/scheduler/sync`   — request one out-of-band sync
//! - `PUT  /v1/scheduler/config` — merge a partial config update
//!
//! The handlers are thin: all state and validation live behind the
//! `Scheduler` handle, which is safe to call from any number of
//! concurrent requests.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use gridline_scheduler::{ConfigUpdate, SchedulerError, SchedulerStatus};

use crate::app::AppState;

type ApiError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, message: String) -> ApiError {
    (status, Json(json!({ "error": message })))
}

/// GET /v1/scheduler/status — copied snapshot, never blocks on the loop.
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}

/// POST /v1/scheduler/sync — non-blocking manual trigger. Returns 202
/// immediately; the iteration runs on the scheduler's own task.
pub async fn sync_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.scheduler.trigger_now() {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "status": "sync scheduled" })),
        )),
        Err(e @ SchedulerError::AlreadyTriggering) => {
            Err(error_body(StatusCode::CONFLICT, e.to_string()))
        }
        Err(e @ SchedulerError::NotRunning) => {
            Err(error_body(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
        Err(e) => Err(error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

/// PUT /v1/scheduler/config — validate-then-apply partial update. A
/// rejected payload leaves the running configuration untouched.
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<Value>, ApiError> {
    let config = state
        .scheduler
        .update_config(&update)
        .map_err(|e| error_body(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(json!({
        "status": "updated",
        "config": {
            "enabled": config.enabled,
            "mode": config.mode_override.map(|m| m.to_string()),
            "live_interval_secs": config.live_interval.as_secs(),
            "active_interval_secs": config.active_interval.as_secs(),
            "standard_interval_secs": config.standard_interval.as_secs(),
            "idle_interval_secs": config.idle_interval.as_secs(),
            "sync_games": config.sync_games,
            "sync_stats": config.sync_stats,
            "sync_injuries": config.sync_injuries,
            "clear_cache": config.clear_cache,
        },
    })))
}
