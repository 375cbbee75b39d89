// src/algorithms/sliding_window.rs

use crate::algorithms::{read_state, Usage, WindowAlgorithm, WindowDecision};
use crate::error::{LimitExceeded, Result};
use crate::quota::WindowStrategy;
use crate::state::SlidingWindowLog;
use crate::storage::StorageBackend;
use async_trait::async_trait;
use tracing::debug;

/// Sliding Window rate limiting algorithm
///
/// Remembers the timestamp of every accepted event inside the trailing
/// window. This costs O(limit) storage per identifier but has no burst at
/// window boundaries. Pruning is recomputed from the stored log on every
/// check, and a rejected check writes nothing back.
#[derive(Debug, Clone)]
pub struct SlidingWindow<S>
where
    S: StorageBackend,
{
    /// Storage backend for persisting event logs
    storage: S,
}

impl<S> SlidingWindow<S>
where
    S: StorageBackend,
{
    /// Creates a new sliding window over the given storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[async_trait]
impl<S> WindowAlgorithm for SlidingWindow<S>
where
    S: StorageBackend,
{
    fn strategy(&self) -> WindowStrategy {
        WindowStrategy::Sliding
    }

    async fn check(
        &self,
        identifier: &str,
        limit: u64,
        duration_seconds: u64,
        now: u64,
    ) -> Result<WindowDecision> {
        let mut log = read_state(&self.storage, identifier, SlidingWindowLog::decode)
            .await
            .unwrap_or_default();

        let stored = log.len();
        log.prune(now, duration_seconds);
        if log.len() != stored {
            debug!(identifier, pruned = stored - log.len(), "Pruned expired events");
        }

        let in_window = log.len() as u64;
        if in_window >= limit {
            return Ok(WindowDecision::Rejected(LimitExceeded {
                identifier: identifier.to_string(),
                limit,
                current_usage: in_window,
            }));
        }

        log.push(now);
        self.storage.set(identifier, &log.encode()).await?;

        // Capacity frees up when the oldest event leaves the window
        let oldest = log.oldest().unwrap_or(now);
        let reset_seconds = duration_seconds.saturating_sub(now.saturating_sub(oldest));

        Ok(WindowDecision::Accepted(Usage {
            current_usage: log.len() as u64,
            reset_seconds,
        }))
    }
}
