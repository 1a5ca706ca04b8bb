//! Console logging setup for binaries and tests embedding the catalog.
//!
//! The library itself only emits `tracing` events; installing a subscriber is left to the
//! application. [`setup_logging`] installs a formatted console subscriber filtered by
//! `RUST_LOG`, falling back to the given base level.
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::astris_errors::AstrisError;

/// Install a console `tracing` subscriber.
///
/// Arguments
/// ---------
/// * `base_level`: filter directive used when `RUST_LOG` is unset or invalid (e.g. `"info"`)
///
/// Return
/// ------
/// * `Ok(())` once installed, or [`AstrisError::InvalidLogFilter`] if neither `RUST_LOG` nor
///   `base_level` is a valid directive. Calling it twice returns `Ok(())` and keeps the first
///   subscriber.
pub fn setup_logging(base_level: &str) -> Result<(), AstrisError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .map_err(|e| AstrisError::InvalidLogFilter(e.to_string()))?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true);

    // A subscriber is already installed (e.g. by another test): keep it
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();

    Ok(())
}
