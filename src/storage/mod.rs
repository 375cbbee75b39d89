// src/storage/mod.rs

pub mod memory;
pub mod redis;

#[cfg(test)]
mod tests;

pub use memory::MemoryStorage;
pub use redis::RedisStorage;

use super::config::{LimiterConfig, StorageKind};
use super::error::StorageResult;
use async_trait::async_trait;
use std::fmt::Debug;

/// Byte-string key-value store holding one window state per identifier.
///
/// Backends offer no expiry, atomic increment or transactions; the window
/// algorithms enforce their own lifetimes on top of plain get/set.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    // The type of configuration this storage backend accepts
    type Config: Send + Sync;

    // Creates a new instance of this storage backend with the given configuration
    async fn new(config: Self::Config) -> StorageResult<Self>
    where
        Self: Sized;

    // Retrieves a value by key
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    // Stores a value with a key, replacing any previous value
    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    // Deletes a key, reporting whether it existed
    async fn delete(&self, key: &str) -> StorageResult<bool>;
}

/// Backend chosen at runtime from [`LimiterConfig`]
#[derive(Debug, Clone)]
pub enum ConfiguredStorage {
    Memory(MemoryStorage),
    Redis(RedisStorage),
}

#[async_trait]
impl StorageBackend for ConfiguredStorage {
    type Config = LimiterConfig;

    async fn new(config: Self::Config) -> StorageResult<Self> {
        match config.backend {
            StorageKind::Memory => Ok(ConfiguredStorage::Memory(MemoryStorage::new(
                config.memory,
            ))),
            StorageKind::Redis => {
                let redis = RedisStorage::new(config.redis).await?;
                redis.ping().await?;
                Ok(ConfiguredStorage::Redis(redis))
            }
        }
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match self {
            ConfiguredStorage::Memory(storage) => storage.get(key).await,
            ConfiguredStorage::Redis(storage) => storage.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        match self {
            ConfiguredStorage::Memory(storage) => storage.set(key, value).await,
            ConfiguredStorage::Redis(storage) => storage.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        match self {
            ConfiguredStorage::Memory(storage) => storage.delete(key).await,
            ConfiguredStorage::Redis(storage) => storage.delete(key).await,
        }
    }
}
