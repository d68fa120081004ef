//! Configuration management

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_CIRCUIT_COOLDOWN, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_INITIAL_DELAY, DEFAULT_JITTER_FACTOR, DEFAULT_LOG_LEVEL,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_READ_TIMEOUT, DEFAULT_TOTAL_TIMEOUT, MAX_RETRY_ATTEMPTS,
};
use crate::errors::{RecordFetchError, Result};
use crate::types::EndpointSpec;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Endpoint set; the built-in catalog is used when empty
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,
}

/// Remote backend location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
}

/// Per-attempt timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub connect_secs: u64,
    pub read_secs: u64,
    pub total_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            read_secs: DEFAULT_READ_TIMEOUT.as_secs(),
            total_secs: DEFAULT_TOTAL_TIMEOUT.as_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }
}

/// Retry schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    /// Fraction of the nominal delay; jitter is drawn from `[-jitter, +jitter]`
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: u64::try_from(DEFAULT_INITIAL_DELAY.as_millis()).unwrap_or(1000),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryConfig {
    /// Delay before the first retry
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Circuit breaker thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown_secs: DEFAULT_CIRCUIT_COOLDOWN.as_secs(),
        }
    }
}

impl CircuitBreakerSettings {
    /// Time a circuit stays open before a probe
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, e.g. `info` or `recordfetch_core=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

impl Config {
    /// Configuration with defaults for everything except the backend URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig { base_url: base_url.into() },
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerSettings::default(),
            logging: LoggingConfig::default(),
            endpoints: Vec::new(),
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `RecordFetchError::Config` naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(config_error("backend.base_url must not be empty"));
        }
        let base = Url::parse(&self.backend.base_url)
            .map_err(|e| config_error(&format!("backend.base_url is not a valid URL: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(config_error("backend.base_url must be an http or https URL"));
        }

        let t = &self.timeouts;
        if t.connect_secs == 0 || t.read_secs == 0 || t.total_secs == 0 {
            return Err(config_error("timeouts must be greater than 0"));
        }
        if t.connect_secs > t.total_secs || t.read_secs > t.total_secs {
            return Err(config_error("connect and read timeouts must not exceed the total timeout"));
        }

        let r = &self.retry;
        if r.max_attempts == 0 || r.max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(config_error(&format!(
                "retry.max_attempts must be within 1..={MAX_RETRY_ATTEMPTS}"
            )));
        }
        if !(r.multiplier >= 1.0) {
            return Err(config_error("retry.multiplier must be at least 1.0"));
        }
        if !(0.0..1.0).contains(&r.jitter) {
            return Err(config_error("retry.jitter must be within [0.0, 1.0)"));
        }

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(config_error("circuit_breaker.failure_threshold must be at least 1"));
        }

        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            if !seen.insert(endpoint.name.as_str()) {
                return Err(config_error(&format!("duplicate endpoint name '{}'", endpoint.name)));
            }
        }

        Ok(())
    }
}

fn config_error(message: &str) -> RecordFetchError {
    RecordFetchError::Config(message.to_string())
}
