use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
///
/// Iteration-internal failures (detection, steps) never escape the
/// control surface — they land in the status snapshot's `last_error`
/// and `error_count` fields. Callers only ever see the config and
/// control variants.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The game activity detector could not read storage.
    #[error("Detection failed: {0}")]
    Detection(String),

    /// An `update_config` payload was rejected; prior config retained.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A manual trigger is already pending; duplicates are dropped.
    #[error("A manual sync is already pending")]
    AlreadyTriggering,

    /// `trigger_now` requires a running loop.
    #[error("Scheduler is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
