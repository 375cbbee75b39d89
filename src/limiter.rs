// src/limiter.rs

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::algorithms::{FixedWindow, SlidingWindow, WindowAlgorithm, WindowDecision};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, UsageLimitError};
use crate::identifier::{resolve_identifier, SessionContext};
use crate::quota::{QuotaDescriptor, WindowStrategy};
use crate::storage::StorageBackend;
use crate::usage_check_event;

/// Status reported after a successful reset
pub const RESET_STATUS: &str = "Reset successfully completed";

/// Parameters of a usage check as received from the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRequest {
    pub user_id: String,

    #[serde(default)]
    pub tracking_method: Option<String>,

    /// Integer literal
    pub limit: String,

    /// Integer literal, defaults to 3600
    #[serde(default)]
    pub duration_seconds: Option<String>,

    /// `fixed` or `sliding`, defaults to `sliding`
    #[serde(default)]
    pub limit_strategy: Option<String>,
}

impl UsageRequest {
    pub fn new(user_id: impl Into<String>, limit: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tracking_method: None,
            limit: limit.into(),
            duration_seconds: None,
            limit_strategy: None,
        }
    }

    pub fn tracking_method(mut self, method: impl Into<String>) -> Self {
        self.tracking_method = Some(method.into());
        self
    }

    pub fn duration_seconds(mut self, duration: impl Into<String>) -> Self {
        self.duration_seconds = Some(duration.into());
        self
    }

    pub fn limit_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.limit_strategy = Some(strategy.into());
        self
    }
}

/// Result of an accepted check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub identifier: String,
    pub limit: u64,
    pub current_usage: u64,
    pub remaining_usage: u64,
    pub reset_seconds: u64,
}

/// Result of a reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    pub identifier: String,
    pub status: String,
}

/// Per-identifier usage limiter over a single storage backend.
///
/// Both window strategies share the storage namespace; an identifier must
/// always be checked with the same strategy since the two encodings cannot
/// read each other.
#[derive(Debug)]
pub struct UsageLimiter<S, C = SystemClock>
where
    S: StorageBackend,
    C: Clock,
{
    storage: S,
    clock: C,
    fixed: FixedWindow<S>,
    sliding: SlidingWindow<S>,
}

impl<S> UsageLimiter<S, SystemClock>
where
    S: StorageBackend + Clone,
{
    /// Creates a limiter that reads the wall clock
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S, C> UsageLimiter<S, C>
where
    S: StorageBackend + Clone,
    C: Clock,
{
    /// Creates a limiter with an explicit time source
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            fixed: FixedWindow::new(storage.clone()),
            sliding: SlidingWindow::new(storage.clone()),
            storage,
            clock,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn algorithm(&self, strategy: WindowStrategy) -> &dyn WindowAlgorithm {
        match strategy {
            WindowStrategy::Fixed => &self.fixed,
            WindowStrategy::Sliding => &self.sliding,
        }
    }

    /// Validates the request, resolves the identifier and records one event.
    ///
    /// Validation happens before any storage access. A subject already at
    /// its limit yields [`UsageLimitError::LimitExceeded`].
    pub async fn check(
        &self,
        request: &UsageRequest,
        session: &SessionContext,
    ) -> Result<UsageReport> {
        let quota = QuotaDescriptor::parse(
            &request.limit,
            request.duration_seconds.as_deref(),
            request.limit_strategy.as_deref(),
        )?;
        let identifier =
            resolve_identifier(&request.user_id, request.tracking_method.as_deref(), session)?;

        self.check_identifier(&identifier, &quota).await
    }

    /// Records one event for an already resolved identifier
    pub async fn check_identifier(
        &self,
        identifier: &str,
        quota: &QuotaDescriptor,
    ) -> Result<UsageReport> {
        let decision = self.evaluate(identifier, quota).await?;
        let usage = decision.into_result()?;

        Ok(UsageReport {
            identifier: identifier.to_string(),
            limit: quota.limit,
            current_usage: usage.current_usage,
            remaining_usage: quota.limit.saturating_sub(usage.current_usage),
            reset_seconds: usage.reset_seconds,
        })
    }

    /// Like [`Self::check_identifier`] but reports a rejection as a value
    pub async fn evaluate(
        &self,
        identifier: &str,
        quota: &QuotaDescriptor,
    ) -> Result<WindowDecision> {
        let now = self.clock.now_secs();
        let decision = self
            .algorithm(quota.strategy)
            .check(identifier, quota.limit, quota.duration_seconds, now)
            .await?;

        match &decision {
            WindowDecision::Accepted(usage) => {
                usage_check_event!(
                    identifier,
                    quota.strategy.as_str(),
                    true,
                    quota.limit,
                    usage.current_usage,
                    quota.duration_seconds
                );
            }
            WindowDecision::Rejected(details) => {
                warn!(
                    identifier,
                    strategy = quota.strategy.as_str(),
                    limit = details.limit,
                    current_usage = details.current_usage,
                    "Usage limit exceeded"
                );
            }
        }

        Ok(decision)
    }

    /// Deletes the stored state of the subject, whatever strategy wrote it
    pub async fn reset(
        &self,
        user_id: &str,
        tracking_method: Option<&str>,
        session: &SessionContext,
    ) -> Result<ResetReport> {
        let identifier = resolve_identifier(user_id, tracking_method, session)?;
        self.reset_identifier(&identifier).await
    }

    /// Deletes the stored state of an already resolved identifier
    pub async fn reset_identifier(&self, identifier: &str) -> Result<ResetReport> {
        match self.storage.delete(identifier).await {
            Ok(existed) => {
                info!(identifier, existed, "Usage reset");
                Ok(ResetReport {
                    identifier: identifier.to_string(),
                    status: RESET_STATUS.to_string(),
                })
            }
            Err(source) => {
                error!(identifier, error = %source, "Usage reset failed");
                Err(UsageLimitError::FailedToReset {
                    identifier: identifier.to_string(),
                    source,
                })
            }
        }
    }
}
