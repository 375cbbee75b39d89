// src/storage/memory.rs

// In-memory storage (for testing and single-process usage)
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::config::InMemoryConfig;
use crate::error::{StorageError, StorageResult};
use crate::storage::StorageBackend;

/// Stored value with the order in which it was last written
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    written: u64,
}

/// In-memory storage backend implementation
///
/// Holds at most `max_entries` identifiers. When full, writing a new key
/// evicts the entry whose last write is oldest; that subject starts over
/// from a cold start on its next check.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<String, MemoryEntry>>>,
    writes: Arc<AtomicU64>,
    config: InMemoryConfig,
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Backend("memory storage lock poisoned".to_string())
}

impl MemoryStorage {
    /// Creates a new in-memory storage with the given configuration
    pub fn new(config: InMemoryConfig) -> Self {
        let data = Arc::new(RwLock::new(HashMap::with_capacity(
            config.max_entries.min(10_000),
        )));

        Self {
            data,
            writes: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Removes the least recently written entry, returning its key
    fn evict_oldest(data: &mut HashMap<String, MemoryEntry>) -> Option<String> {
        let oldest = data
            .iter()
            .min_by_key(|(_, entry)| entry.written)
            .map(|(key, _)| key.clone())?;

        data.remove(&oldest);
        Some(oldest)
    }

    /// Number of identifiers currently tracked
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.data.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(InMemoryConfig::default())
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    type Config = InMemoryConfig;

    async fn new(config: Self::Config) -> StorageResult<Self> {
        Ok(Self::new(config))
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;

        // Apply max entries limit
        while data.len() >= self.config.max_entries && !data.contains_key(key) {
            match Self::evict_oldest(&mut data) {
                Some(evicted) => debug!(key, evicted = %evicted, "Evicted oldest entry"),
                None => {
                    return Err(StorageError::CapacityExceeded(format!(
                        "Maximum entries limit of {} reached",
                        self.config.max_entries
                    )));
                }
            }
        }

        let written = self.writes.fetch_add(1, Ordering::Relaxed);
        data.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                written,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.write().map_err(poisoned)?;
        Ok(data.remove(key).is_some())
    }
}
