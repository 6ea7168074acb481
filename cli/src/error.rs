//! Unified error handling for the CLI.

use crate::commands::ParseError;
use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sync error: {0}")]
    Engine(#[from] todo_sync_engine::Error),

    #[error("Invalid command: {0}")]
    Command(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the session can carry on after this error.
    ///
    /// Failed store calls and bad input are reported and the prompt continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Engine(_) | AppError::Command(_))
    }
}

/// Result type alias for command handlers.
pub type Result<T> = std::result::Result<T, AppError>;
