//! Application constants
//!
//! Centralized defaults for the retrieval engine. Configuration overrides
//! any of these at startup.

use std::time::Duration;

// Request timeouts
/// Bound on establishing a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound on reading the response
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Bound on one whole attempt
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(45);

// Retry policy
/// Attempts per endpoint, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Largest accepted `retry.max_attempts`
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Delay before the first retry
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
/// Growth factor between retries
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
/// Jitter drawn uniformly from `[-0.2, +0.2]` of the nominal delay
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

// Circuit breaker
/// Consecutive failed sequences that open a circuit
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
/// Time a circuit stays open before a probe
pub const DEFAULT_CIRCUIT_COOLDOWN: Duration = Duration::from_secs(60);

// Logging
/// Default tracing filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Tracing target for audit events
pub const AUDIT_TARGET: &str = "audit";
