//! Command-line interface for chatstats.
//!
//! This crate wires the analysis library to a small CLI: reply rankings,
//! question listing, and word cloud rendering for Telegram chat exports.

#![deny(missing_docs, unsafe_code)]

/// CLI command definitions and parsing.
pub mod commands;

/// CLI application entry point and configuration.
pub mod app;

/// Error types for CLI operations.
pub mod error;
