//! Error types for the command router.

use thiserror::Error;

/// Errors raised while building or registering a command tree.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A regular-expression pattern failed to compile.
    #[error("Invalid command pattern '{pattern}': {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A command was declared without any pattern.
    #[error("Command has no patterns: {0}")]
    EmptyPatterns(String),
}

/// Result type for command registration.
pub type CommandResult<T> = Result<T, CommandError>;

/// Match failures reported by the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The content was empty or no command pattern matched it.
    #[error("no commands for '{content}'")]
    NoCommandMatch { content: String },

    /// A command matched but left content nothing could consume.
    #[error("command '{pattern}' could not consume '{content}'")]
    TrailingContent { pattern: String, content: String },
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
