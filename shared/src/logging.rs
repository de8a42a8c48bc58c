//! Shared logging initialization for consistent tracing across components

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `default_level` applies when `RUST_LOG` is not set in the environment.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
