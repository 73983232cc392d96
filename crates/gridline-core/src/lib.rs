//! `gridline-core` — shared config, errors, and season calendar.
//!
//! Everything that needs to agree across crates lives here: the figment
//! configuration surface, the workspace error type, and the canonical
//! Eastern-time season/week arithmetic that the scheduler's mode policy
//! and detector both depend on.

pub mod config;
pub mod error;
pub mod season;

pub use error::{GridlineError, Result};
