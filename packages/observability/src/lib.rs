//! # Observability
//!
//! Structured logging for flowbot processes.
//!
//! Processes call [`init`] once at startup and use the standard `tracing`
//! macros everywhere else. Every event is written as one JSON object per line
//! to `~/.flowbot/logs/flowbot.jsonl` (or [`LogConfig::log_path`]), which
//! makes the bot's activity easy to follow with
//! `tail -f ~/.flowbot/logs/flowbot.jsonl | jq`.
//!
//! ```rust,ignore
//! observability::init(observability::LogConfig {
//!     service_name: "flowbot".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! })?;
//! tracing::info!(flow = "main", "listening");
//! ```
//!
//! `RUST_LOG` takes precedence over [`LogConfig::default_level`].

mod file;
mod json_layer;

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use file::JsonlWriter;
pub use json_layer::{JsonLayer, LogLine};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the process, included in every log line.
    pub service_name: String,

    /// Default filter directive (e.g. "debug", "info,stream_ingest=trace").
    pub default_level: String,

    /// Log file path. Defaults to `~/.flowbot/logs/flowbot.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact human-readable logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "flowbot".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Failure to install the global subscriber.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("could not determine home directory for the default log path")]
    NoHomeDir,

    #[error("failed to open log file {path}: {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Default JSONL log file location.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".flowbot").join("logs").join("flowbot.jsonl"))
}

/// Install the global subscriber. Returns the log file in use.
pub fn init(config: LogConfig) -> Result<PathBuf, InitError> {
    let log_path = match config.log_path.clone() {
        Some(path) => path,
        None => default_log_path().ok_or(InitError::NoHomeDir)?,
    };

    let writer = JsonlWriter::open(&log_path).map_err(|source| InitError::OpenLog {
        path: log_path.clone(),
        source,
    })?;
    let json_layer = JsonLayer::new(config.service_name.clone(), writer)
        .with_filter(env_filter(&config.default_level));

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|_| InitError::AlreadyInitialized)?;

    tracing::info!(
        service = %config.service_name,
        log_path = %log_path.display(),
        "observability initialized"
    );
    Ok(log_path)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
