//! `tracing-subscriber` setup driven by [`LoggingConfig`]
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity without touching config files.

use recordfetch_domain::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TracingInitError {
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` if a global subscriber was already installed; the
/// existing one is left in place.
///
/// # Errors
/// Returns [`TracingInitError`] if `config.level` is not a valid filter
/// directive and `RUST_LOG` is unset.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, TracingInitError> {
    let filter = build_filter(config)?;

    let installed = if config.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).try_init().is_ok()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
    };

    Ok(installed)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TracingInitError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| TracingInitError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })
}
