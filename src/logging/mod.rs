// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - Filtering via `RUST_LOG` (defaults to `info` when unset)
/// - Optional JSON formatting for log aggregation systems
/// - Output to stdout for container/cloud-native deployments
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_subscriber(json: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        if let Err(e) = builder.json().try_init() {
            return Err(e);
        }
    } else {
        if let Err(e) = builder.try_init() {
            return Err(e);
        }
    }

    Ok(())
}
