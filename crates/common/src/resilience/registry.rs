//! Named circuit breakers sharing one configuration and clock

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, Clock, ConfigResult, SystemClock,
};

/// Registry of per-endpoint breakers, created on first use
///
/// The registry is owned by whoever drives the calls (and cloned into tasks);
/// breaker state lives as long as the registry does.
pub struct CircuitBreakerRegistry<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    clock: Arc<C>,
    breakers: Arc<DashMap<String, CircuitBreaker<C>>>,
}

impl<C: Clock> Clone for CircuitBreakerRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            breakers: Arc::clone(&self.breakers),
        }
    }
}

impl<C: Clock> fmt::Debug for CircuitBreakerRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("config", &self.config)
            .field("breakers", &self.breakers.len())
            .finish()
    }
}

impl CircuitBreakerRegistry<SystemClock> {
    /// Create a registry whose breakers use the system clock
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CircuitBreakerRegistry<C> {
    /// Create a registry whose breakers all read time from `clock`
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, clock: Arc::new(clock), breakers: Arc::new(DashMap::new()) })
    }

    /// Breaker for `name`, creating a closed one on first use
    pub fn breaker(&self, name: &str) -> CircuitBreaker<C> {
        if let Some(existing) = self.breakers.get(name) {
            return existing.clone();
        }

        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| self.new_breaker(name))
            .clone()
    }

    // Config was validated when the registry was built
    fn new_breaker(&self, name: &str) -> CircuitBreaker<C> {
        CircuitBreaker::from_validated(
            name.to_string(),
            self.config.clone(),
            Arc::clone(&self.clock),
        )
    }

    /// Snapshot of an existing breaker; `None` if `name` was never used
    pub fn snapshot(&self, name: &str) -> Option<CircuitSnapshot> {
        self.breakers.get(name).map(|breaker| breaker.snapshot())
    }

}
