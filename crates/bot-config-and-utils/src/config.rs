//! Configuration management for the bot.

use crate::{CoreError, CoreResult, Paths};
use flowdock_api::{DEFAULT_API_URL, DEFAULT_STREAM_URL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default capacity of the dispatch error channel.
pub const DEFAULT_ERROR_BUFFER: usize = 64;

/// Main bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Personal API token used for both REST and streaming calls.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Organization slug used to qualify bare flow names.
    #[serde(default)]
    pub organization: String,
    /// Flows to listen on, either `flow` or `org/flow`.
    #[serde(default)]
    pub flows: Vec<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
    /// Capacity of the channel carrying per-message errors.
    #[serde(default = "default_error_buffer")]
    pub error_buffer: usize,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_stream_url() -> String {
    DEFAULT_STREAM_URL.to_string()
}

fn default_error_buffer() -> usize {
    DEFAULT_ERROR_BUFFER
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_token: None,
            organization: String::new(),
            flows: Vec::new(),
            api_url: default_api_url(),
            stream_url: default_stream_url(),
            error_buffer: DEFAULT_ERROR_BUFFER,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `FLOWBOT_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(log_level) = lookup("FLOWBOT_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(token) = lookup("FLOWBOT_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(organization) = lookup("FLOWBOT_ORGANIZATION") {
            self.organization = organization;
        }
    }

    /// The API token, or a configuration error if none is set.
    pub fn require_token(&self) -> CoreResult<&str> {
        self.api_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                CoreError::Config(
                    "no API token; set api_token in config.json or FLOWBOT_API_TOKEN".to_string(),
                )
            })
    }

    /// Get the REST API URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }

    /// Get the streaming API URL as a parsed URL.
    pub fn stream_url(&self) -> CoreResult<Url> {
        Url::parse(&self.stream_url).map_err(CoreError::from)
    }
}
