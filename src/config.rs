use std::time::Duration;

use serde::Deserialize;

/// Connection settings for the SQL adapters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub url: String,
    pub max_connections: u32,
    /// How long to wait for a pooled connection before the operation fails
    /// with a storage error.
    pub acquire_timeout_ms: u64,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            acquire_timeout_ms: 30_000,
        }
    }
}
