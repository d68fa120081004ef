//! Modular common utilities shared across RecordFetch crates.
//!
//! # Features
//!
//! Nothing is compiled without opting in:
//! - `runtime`: resilience primitives (circuit breaker, breaker registry,
//!   retry policy) with tracing

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitBreakerRegistry,
    CircuitOpen, CircuitPermit, CircuitSnapshot, CircuitState, Clock, MockClock, RetryAttempt,
    RetryClass, RetryDecision, RetryPolicy, StopReason, SystemClock,
};
