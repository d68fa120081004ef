//! Bounded retry policy with jittered exponential backoff
//!
//! The policy is a pure decision function. Callers classify the outcome of an
//! attempt into a [`RetryClass`] and ask the policy what to do next; the policy
//! never sleeps and never performs I/O. Server-directed delays (e.g. a
//! `Retry-After` header) are honored verbatim and do not advance the
//! exponential schedule.

use std::fmt;
use std::time::Duration;

use rand::Rng;

use super::circuit_breaker::{ConfigError, ConfigResult};

/// Upper bound on `max_attempts`
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Ceiling for a scheduled delay before jitter
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// How an attempt outcome relates to retrying
#[derive(Debug, Clone, PartialEq)]
pub enum RetryClass {
    /// The attempt succeeded
    Success,
    /// Transient failure worth retrying on the exponential schedule
    Transient { reason: String },
    /// Server asked the caller to slow down, optionally with an explicit delay
    RateLimited { retry_after: Option<Duration> },
    /// Permanent failure, retrying cannot help
    Terminal,
}

/// Why a sequence stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Succeeded,
    Terminal,
    /// Attempt budget exhausted; the last outcome is final
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Succeeded => write!(f, "succeeded"),
            StopReason::Terminal => write!(f, "terminal"),
            StopReason::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// One retry decision
#[derive(Debug, Clone, PartialEq)]
pub struct RetryAttempt {
    /// 1-based number of the attempt about to be made
    pub attempt: u32,
    /// Delay to wait before that attempt
    pub delay: Duration,
    /// Multiplicative jitter applied to the nominal delay (0.0 when none)
    pub jitter: f64,
    /// Whether the delay came from the server rather than the schedule
    pub server_directed: bool,
    pub reason: String,
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    Retry(RetryAttempt),
    Stop(StopReason),
}

/// Retry schedule: `initial_delay * multiplier^(step - 1)`, jittered by a
/// factor drawn uniformly from `[-jitter_factor, +jitter_factor]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Create a policy builder
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(ConfigError::Invalid {
                message: format!("max_attempts must be within 1..={MAX_ATTEMPTS_LIMIT}"),
            });
        }

        if !(self.multiplier >= 1.0) {
            return Err(ConfigError::Invalid {
                message: "multiplier must be at least 1.0".to_string(),
            });
        }

        if !(0.0..1.0).contains(&self.jitter_factor) {
            return Err(ConfigError::Invalid {
                message: "jitter_factor must be within [0.0, 1.0)".to_string(),
            });
        }

        Ok(())
    }

    /// Nominal delay for the given exponential step (1-based), before jitter.
    /// Saturates at [`MAX_BACKOFF`].
    pub fn nominal_delay(&self, step: u32) -> Duration {
        let exponent = i32::try_from(step.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }

    /// Decide what to do after `attempt` (1-based) produced an outcome of
    /// `class`. `exponential_step` is the number of exponential-schedule
    /// retries already taken plus one.
    pub fn decide(&self, attempt: u32, class: &RetryClass, exponential_step: u32) -> RetryDecision {
        let jitter = self.sample_jitter();
        self.decide_with_jitter(attempt, class, exponential_step, jitter)
    }

    /// Deterministic variant of [`decide`](Self::decide) with an explicit
    /// jitter sample; the sample is clamped to the configured bound.
    pub fn decide_with_jitter(
        &self,
        attempt: u32,
        class: &RetryClass,
        exponential_step: u32,
        jitter: f64,
    ) -> RetryDecision {
        let reason = match class {
            RetryClass::Success => return RetryDecision::Stop(StopReason::Succeeded),
            RetryClass::Terminal => return RetryDecision::Stop(StopReason::Terminal),
            _ if attempt >= self.max_attempts => return RetryDecision::Stop(StopReason::Exhausted),
            RetryClass::RateLimited { retry_after: Some(delay) } => {
                return RetryDecision::Retry(RetryAttempt {
                    attempt: attempt + 1,
                    delay: *delay,
                    jitter: 0.0,
                    server_directed: true,
                    reason: "rate limited".to_string(),
                });
            }
            RetryClass::RateLimited { retry_after: None } => "rate limited".to_string(),
            RetryClass::Transient { reason } => reason.clone(),
        };

        let jitter = jitter.clamp(-self.jitter_factor, self.jitter_factor);
        let delay = self.nominal_delay(exponential_step).mul_f64(1.0 + jitter);

        RetryDecision::Retry(RetryAttempt {
            attempt: attempt + 1,
            delay,
            jitter,
            server_directed: false,
            reason,
        })
    }

    fn sample_jitter(&self) -> f64 {
        if self.jitter_factor <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(-self.jitter_factor..=self.jitter_factor)
    }
}

/// Builder for RetryPolicy with fluent API
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Start from the default policy
    pub fn new() -> Self {
        Self { policy: RetryPolicy::default() }
    }

    /// Total attempts including the first
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    /// Delay before the first retry and the factor applied per step
    pub fn exponential_backoff(mut self, initial_delay: Duration, multiplier: f64) -> Self {
        self.policy.initial_delay = initial_delay;
        self.policy.multiplier = multiplier;
        self
    }

    /// Jitter bound as a fraction of the nominal delay
    pub fn jitter(mut self, factor: f64) -> Self {
        self.policy.jitter_factor = factor;
        self
    }

    /// Use the nominal schedule exactly
    pub fn no_jitter(mut self) -> Self {
        self.policy.jitter_factor = 0.0;
        self
    }

    /// Validate and return the policy
    pub fn build(self) -> ConfigResult<RetryPolicy> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
