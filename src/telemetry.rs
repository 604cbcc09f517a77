//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use warden_core::config::LoggingConfig;
use warden_core::error::AppError;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the configured level. Any format other than
/// `json` selects the human-readable pretty printer. Fails if a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install tracing subscriber: {e}")))
}
