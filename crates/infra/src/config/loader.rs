//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `RECORDFETCH_BASE_URL` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `RECORDFETCH_BASE_URL`: Backend base URL (required)
//! - `RECORDFETCH_CONNECT_TIMEOUT_SECS`: Connect timeout in seconds
//! - `RECORDFETCH_READ_TIMEOUT_SECS`: Read timeout in seconds
//! - `RECORDFETCH_TOTAL_TIMEOUT_SECS`: Total per-attempt timeout in seconds
//! - `RECORDFETCH_MAX_ATTEMPTS`: Attempts per endpoint, including the first
//! - `RECORDFETCH_LOG_LEVEL`: Log filter directive
//! - `RECORDFETCH_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./recordfetch.json` or `./recordfetch.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use recordfetch_domain::{Config, RecordFetchError, Result};

use crate::errors::InfraError;

const BASE_URL_VAR: &str = "RECORDFETCH_BASE_URL";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `RecordFetchError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only the base URL is required; everything else falls back to defaults.
/// The endpoint set is always the built-in catalog.
///
/// # Errors
/// Returns `RecordFetchError::Config` if the base URL is missing, a numeric
/// variable does not parse, or the result fails validation.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::with_base_url(env_var(BASE_URL_VAR)?);

    if let Some(secs) = env_parse("RECORDFETCH_CONNECT_TIMEOUT_SECS")? {
        config.timeouts.connect_secs = secs;
    }
    if let Some(secs) = env_parse("RECORDFETCH_READ_TIMEOUT_SECS")? {
        config.timeouts.read_secs = secs;
    }
    if let Some(secs) = env_parse("RECORDFETCH_TOTAL_TIMEOUT_SECS")? {
        config.timeouts.total_secs = secs;
    }
    if let Some(attempts) = env_parse("RECORDFETCH_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Ok(level) = std::env::var("RECORDFETCH_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("RECORDFETCH_LOG_JSON", config.logging.json);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RecordFetchError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The parsed configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RecordFetchError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RecordFetchError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;
    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `RecordFetchError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(InfraError::from)?),
        "json" => Ok(serde_json::from_str(contents).map_err(InfraError::from)?),
        _ => Err(RecordFetchError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("recordfetch.json"),
            cwd.join("recordfetch.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("recordfetch.json"),
                exe_dir.join("recordfetch.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `RecordFetchError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            RecordFetchError::Config(format!("Missing required environment variable: {}", key))
        })
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `RecordFetchError::Config` if the variable is set but does not
/// parse as `T`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| RecordFetchError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
