//! Core types, errors, and configuration for chatstats.
//!
//! This crate owns the Telegram export data model and its JSON loader. The
//! analysis crate builds the statistics and word cloud on top of it.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::ChatStatsConfig;
pub use error::{Error, Result};
pub use types::*;
