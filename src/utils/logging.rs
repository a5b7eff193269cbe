// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Sets up the logging framework using tracing_subscriber.
/// Reads log level filters from the `RUST_LOG` environment variable.
/// Falls back to "info", or to "debug" for this crate when `verbose` is set.
pub fn setup_logging(verbose: bool) {
    let default_directive = if verbose { "info,lcp_compare=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init so a second call (e.g. from tests) does not panic
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .try_init();

    tracing::debug!("Logging setup complete.");
}
