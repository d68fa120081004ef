//! Per-endpoint circuit breaker
//!
//! A breaker tracks consecutive failures of one remote endpoint and fast-fails
//! calls while the endpoint is considered unhealthy. Gating is expressed as a
//! permit: callers acquire a [`CircuitPermit`] before doing work and resolve it
//! with the terminal result of that work. Open to half-open transitions are
//! evaluated lazily at acquisition time; there is no background timer.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

//==============================================================================
// Time Abstraction for Testability
//==============================================================================

/// Trait for time operations to enable deterministic testing
///
/// Breakers use real system time in production and controlled mock time in
/// tests, so cooldown behavior can be exercised without actual delays.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed counter, so advancing one clone advances
/// every breaker built from it.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Advance the mock clock by whole seconds
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejection returned when the breaker refuses a call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Circuit for '{name}' is {state}, rejecting call")]
pub struct CircuitOpen {
    pub name: String,
    pub state: CircuitState,
    /// Time left until the next probe is allowed, if the breaker is cooling down
    pub retry_in: Option<Duration>,
}

//==============================================================================
// State
//==============================================================================

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Fast-fail, calls are rejected until the cooldown elapses
    Open,
    /// Cooldown elapsed, a single probe call is allowed
    HalfOpen,
}

impl CircuitState {
    /// Stable label for logs and outcome summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable record guarded by the breaker's mutex
#[derive(Debug, Clone)]
struct CircuitRecord {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

impl CircuitRecord {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
            opened_at: None,
            probe_in_flight: false,
        }
    }
}

/// Point-in-time view of a breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub last_failure_at: Option<Instant>,
    pub opened_at: Option<Instant>,
    pub probe_in_flight: bool,
}

//==============================================================================
// Configuration
//==============================================================================

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Time spent open before a probe is allowed
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, cooldown: Duration::from_secs(60) }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    /// Consecutive failures that open the circuit
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    /// Time spent open before a probe is allowed
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.config.cooldown = cooldown;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//==============================================================================
// Breaker
//==============================================================================

/// Circuit breaker for a single named endpoint
///
/// Clones share state, so a breaker can be handed to a spawned task while the
/// registry keeps its own handle.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    name: Arc<str>,
    config: CircuitBreakerConfig,
    record: Arc<Mutex<CircuitRecord>>,
    clock: Arc<C>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &record.state)
            .field("consecutive_failures", &record.consecutive_failures)
            .finish()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            config: self.config.clone(),
            record: Arc::clone(&self.record),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Breakers are only built by the registry, which validates `config` once
    pub(crate) fn from_validated(
        name: String,
        config: CircuitBreakerConfig,
        clock: Arc<C>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            config,
            record: Arc::new(Mutex::new(CircuitRecord::closed())),
            clock,
        }
    }

    /// Ask for permission to run one call sequence.
    ///
    /// - `closed`: always granted.
    /// - `open`: rejected until the cooldown has elapsed since the circuit
    ///   opened, then the circuit moves to `half_open` and this caller becomes
    ///   the probe.
    /// - `half_open`: granted only if no probe is in flight.
    ///
    /// # Errors
    /// Returns [`CircuitOpen`] when the call must be skipped.
    pub fn try_acquire(&self) -> Result<CircuitPermit<C>, CircuitOpen> {
        let now = self.clock.now();
        let mut record = self.record.lock();

        match record.state {
            CircuitState::Closed => Ok(self.permit(false)),
            CircuitState::Open => {
                let opened_at = record.opened_at.unwrap_or(now);
                let elapsed = now.saturating_duration_since(opened_at);
                if elapsed >= self.config.cooldown {
                    record.state = CircuitState::HalfOpen;
                    record.probe_in_flight = true;
                    info!(endpoint = %self.name, "circuit half-open, allowing probe");
                    Ok(self.permit(true))
                } else {
                    debug!(endpoint = %self.name, "circuit open, rejecting call");
                    Err(CircuitOpen {
                        name: self.name.to_string(),
                        state: CircuitState::Open,
                        retry_in: Some(self.config.cooldown - elapsed),
                    })
                }
            }
            CircuitState::HalfOpen => {
                if record.probe_in_flight {
                    debug!(endpoint = %self.name, "probe in flight, rejecting call");
                    Err(CircuitOpen {
                        name: self.name.to_string(),
                        state: CircuitState::HalfOpen,
                        retry_in: None,
                    })
                } else {
                    record.probe_in_flight = true;
                    Ok(self.permit(true))
                }
            }
        }
    }

    fn permit(&self, probe: bool) -> CircuitPermit<C> {
        CircuitPermit { breaker: self.clone(), probe, resolved: false }
    }

    fn on_success(&self, probe: bool) {
        let mut record = self.record.lock();
        record.consecutive_failures = 0;

        if probe {
            record.probe_in_flight = false;
        }

        match record.state {
            CircuitState::Closed => {}
            CircuitState::HalfOpen if probe => {
                record.state = CircuitState::Closed;
                record.opened_at = None;
                info!(endpoint = %self.name, "probe succeeded, circuit closed");
            }
            // A sequence that started before the circuit opened does not close it
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    fn on_failure(&self, probe: bool) {
        let now = self.clock.now();
        let mut record = self.record.lock();
        record.consecutive_failures = record.consecutive_failures.saturating_add(1);
        record.last_failure_at = Some(now);

        if probe {
            record.probe_in_flight = false;
        }

        match record.state {
            CircuitState::Closed => {
                if record.consecutive_failures >= self.config.failure_threshold {
                    record.state = CircuitState::Open;
                    record.opened_at = Some(now);
                    warn!(
                        endpoint = %self.name,
                        failures = record.consecutive_failures,
                        "circuit opened"
                    );
                }
            }
            CircuitState::HalfOpen if probe => {
                record.state = CircuitState::Open;
                record.opened_at = Some(now);
                warn!(endpoint = %self.name, "probe failed, circuit re-opened");
            }
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    /// Current state without triggering the lazy open to half-open transition
    pub fn state(&self) -> CircuitState {
        self.record.lock().state
    }

    /// Point-in-time copy of the breaker record
    pub fn snapshot(&self) -> CircuitSnapshot {
        let record = self.record.lock();
        CircuitSnapshot {
            state: record.state,
            consecutive_failures: record.consecutive_failures,
            last_failure_at: record.last_failure_at,
            opened_at: record.opened_at,
            probe_in_flight: record.probe_in_flight,
        }
    }
}

//==============================================================================
// Permit
//==============================================================================

/// Permission to run one call sequence through a breaker
///
/// Resolve with [`succeed`](Self::succeed) or [`fail`](Self::fail). A permit
/// dropped without being resolved counts as a failure, so a panicking caller
/// never leaves a probe stuck in flight.
#[must_use = "a permit must be resolved with succeed() or fail()"]
pub struct CircuitPermit<C: Clock = SystemClock> {
    breaker: CircuitBreaker<C>,
    probe: bool,
    resolved: bool,
}

impl<C: Clock> CircuitPermit<C> {
    /// Whether this permit is the single half-open probe
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    /// Record the guarded sequence as successful
    pub fn succeed(mut self) {
        self.resolved = true;
        self.breaker.on_success(self.probe);
    }

    /// Record the guarded sequence as failed
    pub fn fail(mut self) {
        self.resolved = true;
        self.breaker.on_failure(self.probe);
    }
}

impl<C: Clock> fmt::Debug for CircuitPermit<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitPermit")
            .field("endpoint", &self.breaker.name)
            .field("probe", &self.probe)
            .finish()
    }
}

impl<C: Clock> Drop for CircuitPermit<C> {
    fn drop(&mut self) {
        if !self.resolved {
            warn!(endpoint = %self.breaker.name, "permit dropped unresolved, recording failure");
            self.breaker.on_failure(self.probe);
        }
    }
}
