//! `gridline-store` — SQLite persistence and the in-process response cache.
//!
//! The `games`, `game_team_stats`, and `injuries` tables are the local
//! mirror of upstream data. All writes are idempotent upserts keyed by
//! natural identifiers (external game id; player id + season) so the
//! scheduler can safely re-run a sync at any tempo.

pub mod cache;
pub mod db;
pub mod error;
pub mod games;
pub mod types;

pub use cache::ResponseCache;
pub use error::{Result, StoreError};
pub use games::{GameNeedingStats, GameStore};
pub use types::{DaySummary, GameStatus, GameUpdate, InjuryUpdate, TeamStatLine};
