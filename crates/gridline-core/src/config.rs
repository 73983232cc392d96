use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18600;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (gridline.toml + GRIDLINE_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridlineConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub feed: FeedSection,
}

impl Default for GridlineConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            scheduler: SchedulerSection::default(),
            feed: FeedSection::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Scheduler subsystem settings as read from config.
///
/// `enabled = false` disables the whole subsystem at process start —
/// the gateway never calls `start()`. The runtime scheduler config is
/// built from this section and mutated only through the control surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Every minute while games are in progress.
    #[serde(default = "default_live_secs")]
    pub live_interval_secs: u64,
    /// Every 5 minutes on game days outside game windows.
    #[serde(default = "default_active_secs")]
    pub active_interval_secs: u64,
    /// Every 15 minutes on non-game days during the season.
    #[serde(default = "default_standard_secs")]
    pub standard_interval_secs: u64,
    /// Hourly during the offseason.
    #[serde(default = "default_idle_secs")]
    pub idle_interval_secs: u64,
    #[serde(default = "bool_true")]
    pub sync_games: bool,
    #[serde(default = "bool_true")]
    pub sync_stats: bool,
    #[serde(default = "bool_true")]
    pub sync_injuries: bool,
    #[serde(default = "bool_true")]
    pub clear_cache: bool,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            live_interval_secs: default_live_secs(),
            active_interval_secs: default_active_secs(),
            standard_interval_secs: default_standard_secs(),
            idle_interval_secs: default_idle_secs(),
            sync_games: true,
            sync_stats: true,
            sync_injuries: true,
            clear_cache: true,
        }
    }
}

/// Upstream scoreboard feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSection {
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,
    /// Hard cap per upstream request so a hung fetch can never block
    /// scheduler shutdown.
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_secs: default_feed_timeout_secs(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_live_secs() -> u64 {
    60
}
fn default_active_secs() -> u64 {
    300
}
fn default_standard_secs() -> u64 {
    900
}
fn default_idle_secs() -> u64 {
    3600
}
fn default_feed_base_url() -> String {
    "https://site.api.espn.com".to_string()
}
fn default_feed_timeout_secs() -> u64 {
    20
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.gridline/gridline.db", home)
}

impl GridlineConfig {
    /// Load config from a TOML file with GRIDLINE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.gridline/gridline.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: GridlineConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("GRIDLINE_").split("_"))
            .extract()
            .map_err(|e| crate::error::GridlineError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.gridline/gridline.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = GridlineConfig::default();
        assert!(cfg.scheduler.enabled);
        assert_eq!(cfg.scheduler.live_interval_secs, 60);
        assert_eq!(cfg.scheduler.idle_interval_secs, 3600);
        assert!(cfg.scheduler.sync_games);
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = GridlineConfig::load(Some("/nonexistent/gridline.toml")).unwrap();
        assert_eq!(cfg.scheduler.standard_interval_secs, 900);
        assert!(cfg.feed.base_url.starts_with("https://"));
    }
}
