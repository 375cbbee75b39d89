// library entry
pub mod algorithms;
pub mod clock;
pub mod config;
pub mod error;
pub mod identifier;
pub mod limiter;
pub mod logging;
pub mod quota;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

// Re-export key components for convenience
pub use algorithms::{Usage, WindowAlgorithm, WindowDecision};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LimitExceeded, Result, StorageError, UsageLimitError};
pub use identifier::{resolve_identifier, SessionContext, TrackingMethod};
pub use limiter::{ResetReport, UsageLimiter, UsageReport, UsageRequest, RESET_STATUS};
pub use logging::init as init_logging;
pub use quota::{QuotaDescriptor, WindowStrategy, DEFAULT_DURATION_SECONDS};
pub use storage::{ConfiguredStorage, StorageBackend};
