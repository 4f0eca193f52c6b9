//! Logging infrastructure for the queue engine.
//!
//! This module provides:
//! - Per-item loggers with file + callback dual output
//! - Tail buffer used to build the retained failure description
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use mtq_core::logging::{ItemLogger, LogConfig};
//!
//! let logger = ItemLogger::new("Heat (1995)", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Search Metadata");
//! logger.info("Searching Movies for 'Heat'");
//! logger.success("Item completed");
//! ```

mod item_logger;
mod types;

use std::path::Path;

pub use item_logger::ItemLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling application log.
const APP_LOG_PREFIX: &str = "mtq.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Like [`init_tracing`], plus a daily-rolling log file in `log_dir`.
///
/// The returned guard flushes the file writer on drop and must be held
/// for the life of the application.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let appender = tracing_appender::rolling::daily(log_dir, APP_LOG_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(level_to_filter_str(LogLevel::Debug), "debug");
        assert_eq!(level_to_filter_str(LogLevel::Warn), "warn");
    }
}
