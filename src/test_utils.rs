// src/test_utils.rs

use super::clock::ManualClock;
use super::error::{StorageError, StorageResult};
use super::limiter::UsageLimiter;
use super::storage::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Timestamp used by the fixed-time scenarios
pub const NOW: u64 = 1_000_000;

/// A storage call seen by [`MockStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Get(String),
    Set(String, Vec<u8>),
    Delete(String),
}

/// Mock implementation of the StorageBackend trait for testing.
///
/// Clones share data, call log and failure switches.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<Vec<StorageCall>>>,
    fail_get: Arc<AtomicBool>,
    fail_set: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-loaded with one raw value
    pub fn with_value(key: &str, value: &[u8]) -> Self {
        let storage = Self::new();
        storage.put(key, value);
        storage
    }

    /// Writes a value without recording a call
    pub fn put(&self, key: &str, value: &[u8]) {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    /// Reads a value without recording a call
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().unwrap().get(key).cloned()
    }

    /// Raw value as a string, for asserting on the wire format
    pub fn raw_str(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Set(key, value) => Some((key, value)),
                _ => None,
            })
            .collect()
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StorageBackend for MockStorage {
    type Config = ();

    async fn new(_config: Self::Config) -> StorageResult<Self> {
        Ok(Self::new())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.record(StorageCall::Get(key.to_string()));
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Storage get failed".to_string()));
        }

        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.record(StorageCall::Set(key.to_string(), value.to_vec()));
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Storage set failed".to_string()));
        }

        self.put(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        self.record(StorageCall::Delete(key.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Storage delete failed".to_string()));
        }

        Ok(self.data.lock().unwrap().remove(key).is_some())
    }
}

/// Helper function to create a test limiter on mock storage with a manual clock at [`NOW`]
pub fn create_test_limiter(storage: MockStorage) -> UsageLimiter<MockStorage, ManualClock> {
    UsageLimiter::with_clock(storage, ManualClock::new(NOW))
}
