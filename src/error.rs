// for error definitions
use std::fmt;
use thiserror::Error;

/// Payload carried when a subject is already at capacity.
///
/// Shared by [`crate::WindowDecision::Rejected`] and
/// [`UsageLimitError::LimitExceeded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitExceeded {
    pub identifier: String,
    pub limit: u64,
    pub current_usage: u64,
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Usage limit exceeded for {}: {} messages sent, limit is {}",
            self.identifier, self.current_usage, self.limit
        )
    }
}

#[derive(Error, Debug)]
pub enum UsageLimitError {
    /// The tracking-mode token did not name a known mode
    #[error("Invalid tracking method: {0}")]
    InvalidTrackingMethod(String),

    /// The strategy token was neither `fixed` nor `sliding`
    #[error("Invalid window strategy: {0}")]
    InvalidWindowStrategy(String),

    /// `limit` or `duration_seconds` was not a positive integer literal
    #[error("Invalid {field} value: {value:?} is not a positive integer")]
    InvalidQuotaLiteral { field: &'static str, value: String },

    /// The tracking mode resolved to an empty identifier
    #[error("Tracking method {0} resolved to an empty identifier")]
    EmptyIdentifier(String),

    /// Returned when the subject is already at its limit
    #[error("{0}")]
    LimitExceeded(LimitExceeded),

    /// Deleting stored state during an explicit reset failed
    #[error("Failed to delete usage limit for identifier {identifier}: {source}")]
    FailedToReset {
        identifier: String,
        #[source]
        source: StorageError,
    },

    /// Errors related to the storage backend
    #[error("Storage error: {0}")]
    Storage(StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UsageLimitError {
    /// True for the limit-exceeded outcome, which callers usually branch on
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, UsageLimitError::LimitExceeded(_))
    }
}

impl From<LimitExceeded> for UsageLimitError {
    fn from(details: LimitExceeded) -> Self {
        UsageLimitError::LimitExceeded(details)
    }
}

impl From<StorageError> for UsageLimitError {
    fn from(err: StorageError) -> Self {
        UsageLimitError::Storage(err)
    }
}

/// Storage-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Redis connection errors
    #[error("Redis connection error: {0}")]
    RedisConnection(String),

    // Redis authentication errors
    #[error("Redis authentication error: {0}")]
    RedisAuth(String),

    /// Redis command errors
    #[error("Redis command error: {0}")]
    RedisCommand(String),

    /// Stored bytes could not be decoded into window state
    #[error("Data serialization error: {0}")]
    Serialization(String),

    /// The in-memory store is full and the key is new
    #[error("Storage capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::AuthenticationFailed => StorageError::RedisAuth(err.to_string()),
            redis::ErrorKind::IoError | redis::ErrorKind::ClientError => {
                StorageError::RedisConnection(err.to_string())
            }
            _ => StorageError::RedisCommand(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for UsageLimitError {
    fn from(err: redis::RedisError) -> Self {
        UsageLimitError::Storage(err.into())
    }
}

// implement conversions from serde_json::Error to UsageLimitError
impl From<serde_json::Error> for UsageLimitError {
    fn from(err: serde_json::Error) -> Self {
        UsageLimitError::Storage(StorageError::Serialization(err.to_string()))
    }
}

// define a Result type alias for convenience
pub type Result<T> = std::result::Result<T, UsageLimitError>;

/// Result type returned by storage backends
pub type StorageResult<T> = std::result::Result<T, StorageError>;
