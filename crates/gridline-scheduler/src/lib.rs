//! `gridline-scheduler` — the adaptive sync scheduler.
//!
//! # Overview
//!
//! A single background loop keeps the local mirror fresh without
//! hammering rate-limited upstream sources. Each iteration the loop
//! asks the [`detector::GameDetector`] what today looks like, lets
//! [`policy::decide_mode`] pick an operating tempo, runs the
//! [`pipeline::SyncPipeline`] with per-step failure isolation, then
//! publishes a [`types::SchedulerStatus`] snapshot and sleeps for the
//! mode's interval.
//!
//! # Modes
//!
//! | Mode       | When                                   | Interval (default) |
//! |------------|----------------------------------------|--------------------|
//! | `Live`     | games in a kickoff window or in play   | 1 minute           |
//! | `Active`   | game day, outside the windows          | 5 minutes          |
//! | `Standard` | in season, no games today              | 15 minutes         |
//! | `Idle`     | offseason                              | 1 hour             |
//!
//! Exactly one scheduler loop runs per process. Operators interact
//! through the cloneable [`engine::Scheduler`] handle: read a copied
//! status snapshot, force an out-of-band run, patch the configuration,
//! or start/stop the loop.

pub mod detector;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod types;

pub use detector::GameDetector;
pub use engine::Scheduler;
pub use error::{Result, SchedulerError};
pub use pipeline::{StepContext, StepError, SyncPipeline, SyncStep};
pub use types::{ConfigUpdate, GameDayInfo, SchedulerConfig, SchedulerStatus, SyncMode, SyncStepResult};
