//! Configuration management for the CLI.

use std::env;
use std::time::Duration;

use todo_sync_engine::config::parse_flag;
use todo_sync_engine::SyncConfig;

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seed the in-memory store with the starter todos
    pub seed: bool,
    /// Simulated round-trip latency of the store
    pub latency: Option<Duration>,
    /// Engine configuration
    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = match lookup("TODO_SYNC_SEED") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::InvalidSeed(v))?,
            None => true,
        };

        let latency = match lookup("TODO_SYNC_LATENCY_MS") {
            Some(v) => {
                let millis: u64 = v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidLatency(v.clone()))?;
                (millis > 0).then(|| Duration::from_millis(millis))
            }
            None => None,
        };

        let sync = SyncConfig::from_lookup(&lookup)?;

        Ok(Self {
            seed,
            latency,
            sync,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TODO_SYNC_SEED value: {0}")]
    InvalidSeed(String),

    #[error("Invalid TODO_SYNC_LATENCY_MS value: {0}")]
    InvalidLatency(String),

    #[error(transparent)]
    Sync(#[from] todo_sync_engine::ConfigError),
}
