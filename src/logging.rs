use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Ensure initialization happens only once
static INIT: Once = Once::new();

/// Initialize the logging system with sensible defaults.
///
/// Log level can be set using the RUST_LOG environment variable.
/// Example: RUST_LOG=debug,usage_limiter=trace
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], with the filter used when RUST_LOG is unset
pub fn init_with_default(default_filter: &str) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .init();

        tracing::debug!("Logging initialized");
    });
}

/// Macro for logging the outcome of a usage check
#[macro_export]
macro_rules! usage_check_event {
    ($identifier:expr, $strategy:expr, $allowed:expr, $limit:expr, $usage:expr, $window:expr) => {
        tracing::info!(
            identifier = $identifier,
            strategy = $strategy,
            allowed = $allowed,
            limit = $limit,
            current_usage = $usage,
            window_seconds = $window,
            "Usage check"
        )
    };
}

/// Macro for logging storage operations with timing
#[macro_export]
macro_rules! storage_op {
    ($operation:expr, $key:expr, $result:expr, $elapsed_ms:expr) => {
        tracing::debug!(
            operation = $operation,
            key = $key,
            success = $result.is_ok(),
            elapsed_ms = $elapsed_ms,
            "Storage operation"
        )
    };
}
