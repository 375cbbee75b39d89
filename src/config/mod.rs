// src/config/mod.rs

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{Result, UsageLimitError};

/// Which storage backend the limiter runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Redis,
}

impl std::str::FromStr for StorageKind {
    type Err = UsageLimitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "redis" => Ok(StorageKind::Redis),
            other => Err(UsageLimitError::Config(format!(
                "unknown storage backend {:?}",
                other
            ))),
        }
    }
}

/// Top-level configuration for a usage limiter process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimiterConfig {
    #[serde(default)]
    pub backend: StorageKind,

    #[serde(default)]
    pub redis: RedisConfig,

    #[serde(default)]
    pub memory: InMemoryConfig,
}

impl LimiterConfig {
    /// Reads configuration from the environment, after loading any `.env` file.
    ///
    /// Recognised variables: `USAGE_LIMIT_STORAGE`, `REDIS_URL`,
    /// `REDIS_CONNECT_TIMEOUT_MS`, `USAGE_LIMIT_MAX_ENTRIES`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(backend) = lookup("USAGE_LIMIT_STORAGE") {
            config.backend = backend.parse()?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            config.redis.url = url;
        }
        if let Some(timeout) = lookup("REDIS_CONNECT_TIMEOUT_MS") {
            let millis = parse_number("REDIS_CONNECT_TIMEOUT_MS", &timeout)?;
            config.redis.connection_timeout = Duration::from_millis(millis);
        }
        if let Some(max_entries) = lookup("USAGE_LIMIT_MAX_ENTRIES") {
            config.memory.max_entries = parse_number("USAGE_LIMIT_MAX_ENTRIES", &max_entries)? as usize;
        }

        Ok(config)
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| UsageLimitError::Config(format!("{} must be an integer, got {:?}", name, value)))
}

/// Configuration for Redis storage backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection timeout
    #[serde(default = "default_conn_timeout", with = "duration_serde")]
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            connection_timeout: default_conn_timeout(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_conn_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Configuration for in-memory storage backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryConfig {
    /// Maximum number of identifiers to store
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

// Helper module to serialize/deserialize Duration with serde
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
