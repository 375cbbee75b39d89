// src/algorithms/fixed_window.rs

use super::{read_state, Usage, WindowAlgorithm, WindowDecision};
use super::super::error::{LimitExceeded, Result};
use super::super::quota::WindowStrategy;
use super::super::state::FixedWindowState;
use super::super::storage::StorageBackend;
use async_trait::async_trait;
use tracing::debug;

/// Fixed Window rate limiting algorithm
///
/// Keeps a `(count, window_start)` pair per identifier. The window is
/// anchored at the first event after a reset rather than at calendar
/// boundaries, and starts over once more than `duration_seconds` have
/// passed since that anchor.
#[derive(Debug, Clone)]
pub struct FixedWindow<S>
where
    S: StorageBackend,
{
    /// Storage backend for persisting window counters
    storage: S,
}

impl<S> FixedWindow<S>
where
    S: StorageBackend,
{
    /// Creates a new fixed window over the given storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[async_trait]
impl<S> WindowAlgorithm for FixedWindow<S>
where
    S: StorageBackend,
{
    fn strategy(&self) -> WindowStrategy {
        WindowStrategy::Fixed
    }

    async fn check(
        &self,
        identifier: &str,
        limit: u64,
        duration_seconds: u64,
        now: u64,
    ) -> Result<WindowDecision> {
        let mut state = read_state(&self.storage, identifier, FixedWindowState::decode)
            .await
            .unwrap_or_else(|| FixedWindowState::empty(now));

        if state.is_expired(now, duration_seconds) {
            debug!(identifier, window_start = state.window_start, "Fixed window expired");
            state = FixedWindowState::empty(now);
        }

        // Remaining life of the current window, before this event is counted
        let reset_seconds = state.reset_seconds(now, duration_seconds);

        if state.count >= limit {
            return Ok(WindowDecision::Rejected(LimitExceeded {
                identifier: identifier.to_string(),
                limit,
                current_usage: state.count,
            }));
        }

        state.count += 1;
        self.storage.set(identifier, &state.encode()).await?;

        Ok(WindowDecision::Accepted(Usage {
            current_usage: state.count,
            reset_seconds,
        }))
    }
}
