//! # Physgate Utilities
//!
//! Shared utilities, logging, config, and helpers for physgate.
//!
//! This crate provides common functionality used across the physgate
//! workspace, chiefly a small console logging bootstrap built on
//! `tracing` for binaries, examples, and tests that do not install a
//! subscriber of their own.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel};
pub use tracing::{debug, error, info, trace, warn};
