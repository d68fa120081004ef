//! Wiring a [`RetrievalOrchestrator`] from loaded configuration

use std::sync::Arc;

use recordfetch_common::resilience::{CircuitBreakerConfig, CircuitBreakerRegistry, RetryPolicy};
use recordfetch_core::{HeaderSource, RetrievalOrchestrator};
use recordfetch_domain::{Config, RecordFetchError, Result};

use crate::audit::TracingAuditSink;
use crate::endpoints::endpoints_for;
use crate::http::HttpRequestExecutor;

/// Build an orchestrator with the reqwest executor, the configured retry and
/// breaker settings, and the tracing audit sink.
///
/// # Errors
/// Returns `RecordFetchError::Config` if the configuration is invalid or the
/// HTTP client cannot be built.
pub fn build_orchestrator(
    config: &Config,
    headers: Arc<dyn HeaderSource>,
) -> Result<RetrievalOrchestrator> {
    config.validate()?;

    let policy = RetryPolicy::builder()
        .max_attempts(config.retry.max_attempts)
        .exponential_backoff(config.retry.initial_delay(), config.retry.multiplier)
        .jitter(config.retry.jitter)
        .build()
        .map_err(|e| RecordFetchError::Config(e.to_string()))?;

    let breaker_config = CircuitBreakerConfig::builder()
        .failure_threshold(config.circuit_breaker.failure_threshold)
        .cooldown(config.circuit_breaker.cooldown())
        .build()
        .map_err(|e| RecordFetchError::Config(e.to_string()))?;
    let breakers = CircuitBreakerRegistry::new(breaker_config)
        .map_err(|e| RecordFetchError::Config(e.to_string()))?;

    let executor = HttpRequestExecutor::from_config(&config.timeouts)?;

    let orchestrator = RetrievalOrchestrator::with_breakers(
        config.backend.base_url.clone(),
        endpoints_for(config),
        Arc::new(executor),
        breakers,
    )?
    .with_header_source(headers)
    .with_retry_policy(policy)
    .with_audit_sink(Arc::new(TracingAuditSink));

    tracing::info!(
        endpoints = orchestrator.endpoints().len(),
        max_attempts = config.retry.max_attempts,
        failure_threshold = config.circuit_breaker.failure_threshold,
        "retrieval orchestrator ready"
    );
    Ok(orchestrator)
}
