//! Resilience patterns for per-endpoint fault tolerance
//!
//! - **Circuit Breaker**: fast-fails calls to an endpoint after repeated
//!   failures, with a lazily evaluated cooldown and a single half-open probe
//! - **Registry**: one breaker per endpoint name, sharing configuration and
//!   clock
//! - **Retry Policy**: pure decision function for bounded retries with
//!   jittered exponential backoff and server-directed delays

pub mod circuit_breaker;
pub mod registry;
pub mod retry;

// Re-export circuit breaker types
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitOpen,
    CircuitPermit, CircuitSnapshot, CircuitState, Clock, ConfigError, ConfigResult, MockClock,
    SystemClock,
};
pub use registry::CircuitBreakerRegistry;
// Re-export retry types
pub use retry::{
    RetryAttempt, RetryClass, RetryDecision, RetryPolicy, RetryPolicyBuilder, StopReason,
    MAX_ATTEMPTS_LIMIT, MAX_BACKOFF,
};
