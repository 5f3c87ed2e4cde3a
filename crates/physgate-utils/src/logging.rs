//! # Logging Utilities
//!
//! Logging bootstrap for physgate using `tracing`.
//!
//! The library crates in this workspace only *emit* `tracing` events;
//! installing a subscriber is the embedding application's call. This module
//! is for binaries, examples, and tests that do not bring their own: one
//! console subscriber, an env-driven filter, and a choice of pretty or JSON
//! output.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: filter spec (e.g. `debug`, `physgate_core=trace`)
//! - `PHYSGATE_LOG_FORMAT`: `pretty` (default) or `json`
//!
//! Misconfiguration is an error, not a silent fallback: a format or filter
//! spec that does not parse comes back as a [`LoggingError`] instead of
//! being swapped for a default behind the caller's back.

use std::env;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize logging from the environment
///
/// Reads `PHYSGATE_LOG_FORMAT` for the output format (absent means pretty)
/// and `RUST_LOG` for the filter (absent means `info`).
///
/// ## Example
///
/// ```rust,no_run
/// use physgate_utils::init_logging;
///
/// init_logging().expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
///
/// ## Errors
///
/// - [`LoggingError::InvalidFormat`]: `PHYSGATE_LOG_FORMAT` is set to
///   something other than `pretty` or `json`
/// - [`LoggingError::InvalidFilter`]: `RUST_LOG` is set but does not parse
///   as a filter spec
/// - [`LoggingError::InitializationFailed`]: a global subscriber is already
///   installed
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = match env::var("PHYSGATE_LOG_FORMAT") {
        Ok(raw) => raw.parse::<LogFormat>().map_err(|_| LoggingError::InvalidFormat(raw))?,
        Err(_) => LogFormat::Pretty,
    };

    let filter = match env::var("RUST_LOG") {
        Ok(spec) => EnvFilter::try_new(&spec).map_err(|err| LoggingError::InvalidFilter(err.to_string()))?,
        Err(_) => EnvFilter::new(Level::INFO.to_string()),
    };

    init_with_filter(format, filter)
}

/// Initialize logging with explicit level and format, ignoring the
/// environment
///
/// ## Example
///
/// ```rust,no_run
/// use physgate_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// - [`LoggingError::InitializationFailed`]: a global subscriber is already
///   installed
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_with_filter(format, EnvFilter::new(Level::from(level).to_string()))
}

fn init_with_filter(format: LogFormat, filter: EnvFilter) -> Result<(), LoggingError>
{
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// `PHYSGATE_LOG_FORMAT` named a format this module does not know
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// `RUST_LOG` held a filter spec `tracing` could not parse
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber was already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_logging_error_carries_the_offending_value()
    {
        let error = LoggingError::InvalidFormat("yaml".to_string());
        assert!(format!("{error}").contains("yaml"));

        let error = LoggingError::InvalidFilter("=???=".to_string());
        assert!(format!("{error}").contains("filter"));
    }
}
