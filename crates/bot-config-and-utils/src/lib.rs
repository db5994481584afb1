//! Configuration, paths and logging setup for flowbot.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_ERROR_BUFFER, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
