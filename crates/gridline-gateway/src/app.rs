use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use gridline_core::config::GridlineConfig;
use gridline_scheduler::Scheduler;
use gridline_store::{GameStore, ResponseCache};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: GridlineConfig,
    pub scheduler: Scheduler,
    pub store: Arc<GameStore>,
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(
        config: GridlineConfig,
        scheduler: Scheduler,
        store: Arc<GameStore>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            config,
            scheduler,
            store,
            cache,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/v1/scheduler/status",
            get(crate::http::scheduler::status_handler),
        )
        .route(
            "/v1/scheduler/sync",
            post(crate::http::scheduler::sync_handler),
        )
        .route(
            "/v1/scheduler/config",
            put(crate::http::scheduler::config_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
