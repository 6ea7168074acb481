//! Error types for the sync engine.

use crate::RecordId;
use thiserror::Error;

/// All possible errors from the sync engine and its store boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Remote store errors
    #[error("{operation} failed: {message}")]
    Transport {
        operation: StoreOp,
        message: String,
    },

    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("creation stream error: {0}")]
    Subscription(String),

    // Validation errors
    #[error("record name must not be empty")]
    EmptyName,
}

impl Error {
    /// Build a transport failure for the given store operation.
    pub fn transport(operation: StoreOp, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }
}

/// Remote store operation kinds, used for error reporting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Delete,
    Subscribe,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreOp::List => "list",
            StoreOp::Create => "create",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
            StoreOp::Subscribe => "subscribe",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for StoreOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "list" => Ok(StoreOp::List),
            "create" => Ok(StoreOp::Create),
            "update" => Ok(StoreOp::Update),
            "delete" => Ok(StoreOp::Delete),
            "subscribe" => Ok(StoreOp::Subscribe),
            other => Err(format!("unknown store operation: {other}")),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
