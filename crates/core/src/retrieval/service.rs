//! Retrieval orchestrator - core business logic
//!
//! One run fans out a task per configured endpoint. Each task resolves its
//! request, asks the endpoint's circuit breaker for a permit, then loops
//! attempts under the retry policy until a terminal outcome. Every failure is
//! captured as data in an [`EndpointOutcome`]; a panicking task is converted
//! into a `validation_error` outcome for that endpoint alone.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use recordfetch_common::resilience::{
    CircuitBreakerRegistry, CircuitSnapshot, Clock, RetryDecision, RetryPolicy, StopReason,
    SystemClock,
};
use recordfetch_domain::{
    AuditEvent, ConsolidatedResult, EndpointOutcome, EndpointSpec, ErrorCategory, RecordFetchError,
    RequestHeaders, Result, SubjectIds,
};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn, Instrument};
use uuid::Uuid;

use super::outcome::AttemptOutcome;
use super::ports::{AuditSink, HeaderSource, NoopAuditSink, RequestExecutor};

/// Shared pieces each endpoint task needs
struct RunContext<C: Clock> {
    executor: Arc<dyn RequestExecutor>,
    audit: Arc<dyn AuditSink>,
    policy: RetryPolicy,
    breakers: CircuitBreakerRegistry<C>,
    base_url: Arc<str>,
}

/// Multi-endpoint retrieval orchestrator
pub struct RetrievalOrchestrator<C: Clock = SystemClock> {
    executor: Arc<dyn RequestExecutor>,
    headers: Arc<dyn HeaderSource>,
    audit: Arc<dyn AuditSink>,
    policy: RetryPolicy,
    breakers: CircuitBreakerRegistry<C>,
    base_url: Arc<str>,
    endpoints: Arc<[EndpointSpec]>,
}

impl RetrievalOrchestrator<SystemClock> {
    /// Create an orchestrator with default retry and breaker settings, no
    /// credentials, and a discarding audit sink.
    ///
    /// # Errors
    /// Returns `RecordFetchError::Config` if `endpoints` is empty or contains
    /// duplicate names.
    pub fn new(
        base_url: impl Into<String>,
        endpoints: Vec<EndpointSpec>,
        executor: Arc<dyn RequestExecutor>,
    ) -> Result<Self> {
        let breakers = CircuitBreakerRegistry::new(Default::default())
            .map_err(|e| RecordFetchError::Config(e.to_string()))?;
        Self::with_breakers(base_url, endpoints, executor, breakers)
    }
}

impl<C: Clock> RetrievalOrchestrator<C> {
    /// Create an orchestrator that keeps breaker state in `breakers`
    ///
    /// # Errors
    /// Returns `RecordFetchError::Config` if `endpoints` is empty or contains
    /// duplicate names.
    pub fn with_breakers(
        base_url: impl Into<String>,
        endpoints: Vec<EndpointSpec>,
        executor: Arc<dyn RequestExecutor>,
        breakers: CircuitBreakerRegistry<C>,
    ) -> Result<Self> {
        validate_endpoints(&endpoints)?;
        let base_url: String = base_url.into();

        Ok(Self {
            executor,
            headers: Arc::new(RequestHeaders::new()),
            audit: Arc::new(NoopAuditSink),
            policy: RetryPolicy::default(),
            breakers,
            base_url: Arc::from(base_url),
            endpoints: Arc::from(endpoints),
        })
    }

    /// Use `headers` for every outgoing request
    pub fn with_header_source(mut self, headers: Arc<dyn HeaderSource>) -> Self {
        self.headers = headers;
        self
    }

    /// Record one audit event per endpoint to `audit`
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replace the default retry schedule
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configured endpoints, in result order
    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    /// Breaker state for `endpoint`; `None` until the endpoint is first called
    pub fn circuit_state(&self, endpoint: &str) -> Option<CircuitSnapshot> {
        self.breakers.snapshot(endpoint)
    }

    /// Retrieve every configured endpoint for `subject` and consolidate.
    ///
    /// Always returns after every endpoint sequence has finished; endpoint
    /// failures are reported inside the result, never as an error.
    #[instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn retrieve(&self, subject: &SubjectIds) -> ConsolidatedResult {
        let run_id = Uuid::now_v7();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let context = Arc::new(RunContext {
            executor: Arc::clone(&self.executor),
            audit: Arc::clone(&self.audit),
            policy: self.policy.clone(),
            breakers: self.breakers.clone(),
            base_url: Arc::clone(&self.base_url),
        });
        let headers = self.headers.headers().await;
        let run_started_at = Utc::now();
        let run_start = Instant::now();

        let handles: Vec<_> = self
            .endpoints
            .iter()
            .cloned()
            .map(|spec| {
                let context = Arc::clone(&context);
                let subject = subject.clone();
                let headers = headers.clone();
                let name = spec.name.clone();
                let handle = tokio::spawn(
                    run_sequence(context, spec, subject, headers, run_id).in_current_span(),
                );
                (name, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(
                        endpoint = %name,
                        panicked = join_error.is_panic(),
                        "endpoint task aborted"
                    );
                    let outcome = EndpointOutcome::failure(
                        name,
                        0,
                        ErrorCategory::ValidationError,
                        "Endpoint processing failed unexpectedly",
                        0,
                        run_started_at,
                        run_start.elapsed(),
                    );
                    self.audit.record(AuditEvent::from_outcome(run_id, &outcome)).await;
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        let result = ConsolidatedResult::from_outcomes(run_id, outcomes);
        info!(
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            exit_code = result.exit_code(),
            "retrieval run complete"
        );
        result
    }
}

fn validate_endpoints(endpoints: &[EndpointSpec]) -> Result<()> {
    if endpoints.is_empty() {
        return Err(RecordFetchError::Config("at least one endpoint must be configured".into()));
    }

    let mut seen = HashSet::new();
    for endpoint in endpoints {
        if !seen.insert(endpoint.name.as_str()) {
            return Err(RecordFetchError::Config(format!(
                "duplicate endpoint name '{}'",
                endpoint.name
            )));
        }
    }
    Ok(())
}

/// One endpoint's attempt sequence
#[instrument(skip_all, fields(endpoint = %spec.name))]
async fn run_sequence<C: Clock>(
    context: Arc<RunContext<C>>,
    spec: EndpointSpec,
    subject: SubjectIds,
    headers: RequestHeaders,
    run_id: Uuid,
) -> EndpointOutcome {
    let started_at = Utc::now();
    let start = Instant::now();

    let outcome = match spec.resolve(&context.base_url, &subject, headers) {
        Err(err) => {
            warn!(error = %err, "request could not be resolved");
            EndpointOutcome::failure(
                &spec.name,
                0,
                ErrorCategory::ClientError,
                err.to_string(),
                0,
                started_at,
                start.elapsed(),
            )
        }
        Ok(request) => match context.breakers.breaker(&spec.name).try_acquire() {
            Err(open) => {
                info!(state = %open.state, "circuit open, skipping endpoint");
                EndpointOutcome::failure(
                    &spec.name,
                    0,
                    ErrorCategory::CircuitOpen,
                    format!("Circuit {}, endpoint skipped", open.state),
                    0,
                    started_at,
                    start.elapsed(),
                )
            }
            Ok(permit) => {
                // A half-open probe is one request, never a retry sequence
                let policy = if permit.is_probe() {
                    RetryPolicy { max_attempts: 1, ..context.policy.clone() }
                } else {
                    context.policy.clone()
                };
                let (last, attempts) = attempt_loop(&context, &policy, &spec, &request).await;
                if last.is_success() {
                    permit.succeed();
                } else {
                    permit.fail();
                }
                into_endpoint_outcome(&spec.name, last, attempts, started_at, start.elapsed())
            }
        },
    };

    context.audit.record(AuditEvent::from_outcome(run_id, &outcome)).await;
    outcome
}

/// Run attempts until the policy stops; returns the last outcome and the
/// number of attempts made
async fn attempt_loop<C: Clock>(
    context: &RunContext<C>,
    policy: &RetryPolicy,
    spec: &EndpointSpec,
    request: &recordfetch_domain::ResolvedRequest,
) -> (AttemptOutcome, u32) {
    let mut attempt = 0;
    let mut exponential_step = 1;

    loop {
        attempt += 1;
        let outcome = context.executor.execute(request).await.check_shape(spec.shape);

        match policy.decide(attempt, &outcome.retry_class(), exponential_step) {
            RetryDecision::Retry(next) => {
                if !next.server_directed {
                    exponential_step += 1;
                }
                debug!(
                    attempt = next.attempt,
                    delay_ms = u64::try_from(next.delay.as_millis()).unwrap_or(u64::MAX),
                    jitter = next.jitter,
                    reason = %next.reason,
                    "retrying"
                );
                tokio::time::sleep(next.delay).await;
            }
            RetryDecision::Stop(reason) => {
                if reason == StopReason::Exhausted {
                    warn!(attempts = attempt, "retries exhausted");
                }
                return (outcome, attempt);
            }
        }
    }
}

fn into_endpoint_outcome(
    endpoint: &str,
    outcome: AttemptOutcome,
    attempts: u32,
    started_at: chrono::DateTime<Utc>,
    duration: std::time::Duration,
) -> EndpointOutcome {
    let status = outcome.status();
    match outcome {
        AttemptOutcome::Success { payload, .. } => {
            EndpointOutcome::success(endpoint, status, payload, attempts, started_at, duration)
        }
        failed => EndpointOutcome::failure(
            endpoint,
            status,
            failed.category().unwrap_or(ErrorCategory::ValidationError),
            failed.summary(),
            attempts,
            started_at,
            duration,
        ),
    }
}
