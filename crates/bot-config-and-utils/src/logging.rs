//! Logging initialization for the bot.
//!
//! Wraps the observability crate: structured JSONL goes to
//! `~/.flowbot/logs/flowbot.jsonl` and, in the foreground, compact lines to
//! stderr. `RUST_LOG` overrides the configured level.

use crate::{CoreResult, Paths};
use observability::LogConfig;
use std::path::PathBuf;

/// Initialize the logging system.
///
/// * `level` - Default log level (trace, debug, info, warn, error)
/// * `paths` - Determines where the log file lives
/// * `also_stderr` - Mirror log lines to stderr
///
/// Returns the path of the log file.
pub fn init_logging(level: &str, paths: &Paths, also_stderr: bool) -> CoreResult<PathBuf> {
    let path = observability::init(LogConfig {
        service_name: "flowbot".into(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr,
    })?;
    Ok(path)
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
