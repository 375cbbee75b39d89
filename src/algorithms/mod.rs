// src/algorithms/mod.rs

pub mod fixed_window;
pub mod sliding_window;

#[cfg(test)]
mod tests;

pub use fixed_window::FixedWindow;
pub use sliding_window::SlidingWindow;

use super::error::{LimitExceeded, Result, StorageResult};
use super::quota::WindowStrategy;
use super::storage::StorageBackend;
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::warn;

/// Usage figures for an accepted check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Accepted events in the current window, including this one
    pub current_usage: u64,

    /// Seconds until the window frees capacity
    pub reset_seconds: u64,
}

/// Outcome of a window check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowDecision {
    /// The event was recorded
    Accepted(Usage),
    /// The subject was already at its limit; nothing was written
    Rejected(LimitExceeded),
}

impl WindowDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WindowDecision::Accepted(_))
    }

    /// Turns a rejection into [`crate::UsageLimitError::LimitExceeded`]
    pub fn into_result(self) -> Result<Usage> {
        match self {
            WindowDecision::Accepted(usage) => Ok(usage),
            WindowDecision::Rejected(details) => Err(details.into()),
        }
    }
}

/// Core trait that both windowing algorithms implement
#[async_trait]
pub trait WindowAlgorithm: Send + Sync + Debug {
    /// The strategy this algorithm implements
    fn strategy(&self) -> WindowStrategy;

    /// Reads the identifier's state, decides, and persists the new state if
    /// the event is accepted.
    ///
    /// `now` is in unix seconds. Read failures count as a cold start; write
    /// failures are returned as errors.
    async fn check(
        &self,
        identifier: &str,
        limit: u64,
        duration_seconds: u64,
        now: u64,
    ) -> Result<WindowDecision>;
}

/// Loads and decodes stored state, treating any failure as "no prior state".
///
/// Empty values count as absent.
pub(crate) async fn read_state<S, T>(
    storage: &S,
    identifier: &str,
    decode: fn(&[u8]) -> StorageResult<T>,
) -> Option<T>
where
    S: StorageBackend,
{
    let bytes = match storage.get(identifier).await {
        Ok(Some(bytes)) if !bytes.is_empty() => bytes,
        Ok(_) => return None,
        Err(e) => {
            warn!(identifier, error = %e, "Storage read failed, treating as cold start");
            return None;
        }
    };

    match decode(&bytes) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(identifier, error = %e, "Stored state is malformed, treating as cold start");
            None
        }
    }
}
