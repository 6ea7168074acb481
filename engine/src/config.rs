//! Engine configuration.
//!
//! Built once at startup and handed to [`SyncEngine`](crate::SyncEngine)
//! explicitly. Values come from environment variables:
//!
//! - `TODO_SYNC_CREATE_POLICY`: `append` (default) or `stream`
//! - `TODO_SYNC_DELETE_POLICY`: `confirmed` (default) or `optimistic`
//! - `TODO_SYNC_COMMIT_TOGGLES`: `true` to persist toggles remotely (default `false`)

use std::env;
use std::str::FromStr;

/// What `add_record` does with the record the store returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Merge the returned record immediately; the echoed event is absorbed by identity
    #[default]
    AppendConfirmed,
    /// Leave the collection alone and wait for the creation stream
    AwaitStream,
}

impl FromStr for CreatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "append_confirmed" => Ok(Self::AppendConfirmed),
            "stream" | "await_stream" => Ok(Self::AwaitStream),
            _ => Err(ConfigError::InvalidCreatePolicy(s.to_string())),
        }
    }
}

/// When `delete_record` removes the record locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Remove after the store confirms, using the id it returned
    #[default]
    Confirmed,
    /// Remove first; put the record back if the store rejects the delete
    Optimistic,
}

impl FromStr for DeletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "optimistic" => Ok(Self::Optimistic),
            _ => Err(ConfigError::InvalidDeletePolicy(s.to_string())),
        }
    }
}

/// Sync engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    pub create_policy: CreatePolicy,
    pub delete_policy: DeletePolicy,
    /// Install the remote toggle hook instead of keeping toggles local
    pub commit_toggles: bool,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let create_policy = lookup("TODO_SYNC_CREATE_POLICY")
            .map(|v| v.parse::<CreatePolicy>())
            .transpose()?
            .unwrap_or_default();

        let delete_policy = lookup("TODO_SYNC_DELETE_POLICY")
            .map(|v| v.parse::<DeletePolicy>())
            .transpose()?
            .unwrap_or_default();

        let commit_toggles = match lookup("TODO_SYNC_COMMIT_TOGGLES") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::InvalidFlag {
                key: "TODO_SYNC_COMMIT_TOGGLES",
                value: v,
            })?,
            None => false,
        };

        Ok(Self {
            create_policy,
            delete_policy,
            commit_toggles,
        })
    }

    pub fn with_create_policy(mut self, policy: CreatePolicy) -> Self {
        self.create_policy = policy;
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

/// Parse a boolean environment flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TODO_SYNC_CREATE_POLICY value: {0} (expected append or stream)")]
    InvalidCreatePolicy(String),

    #[error("invalid TODO_SYNC_DELETE_POLICY value: {0} (expected confirmed or optimistic)")]
    InvalidDeletePolicy(String),

    #[error("invalid {key} value: {value}")]
    InvalidFlag { key: &'static str, value: String },
}
