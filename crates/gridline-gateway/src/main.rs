use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod feed;
mod http;
mod steps;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridline=info,gridline_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: GRIDLINE_CONFIG env path > ~/.gridline/gridline.toml
    let config_path = std::env::var("GRIDLINE_CONFIG").ok();
    let config = gridline_core::config::GridlineConfig::load(config_path.as_deref())
        .unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            gridline_core::config::GridlineConfig::default()
        });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // open SQLite and run schema migrations (idempotent)
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let store = Arc::new(gridline_store::GameStore::new(rusqlite::Connection::open(
        db_path,
    )?)?);

    let cache = Arc::new(gridline_store::ResponseCache::default());
    let feed: Arc<dyn feed::ScoreboardFeed> = Arc::new(feed::EspnFeed::new(&config.feed)?);

    // wire the concrete steps into the fixed-order pipeline
    let pipeline = gridline_scheduler::SyncPipeline::new(
        Box::new(steps::GamesSyncStep::new(
            Arc::clone(&feed),
            Arc::clone(&store),
        )),
        Box::new(steps::TeamStatsSyncStep::new(
            Arc::clone(&feed),
            Arc::clone(&store),
        )),
        Box::new(steps::InjurySyncStep::new(
            Arc::clone(&feed),
            Arc::clone(&store),
        )),
        Box::new(steps::CacheClearStep::new(Arc::clone(&cache))),
    );

    let scheduler = gridline_scheduler::Scheduler::new(
        gridline_scheduler::SchedulerConfig::from_section(&config.scheduler),
        gridline_scheduler::GameDetector::new(Arc::clone(&store)),
        pipeline,
    );

    // process-start switch: when disabled here, the loop never spawns
    // (unlike the runtime `enabled` toggle, which keeps it ticking)
    if config.scheduler.enabled {
        scheduler.start();
    } else {
        info!("sync scheduler disabled by configuration");
    }

    let state = Arc::new(app::AppState::new(
        config,
        scheduler.clone(),
        store,
        cache,
    ));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Gridline gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // let the in-flight sync step finish before exiting
    scheduler.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
    }
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
