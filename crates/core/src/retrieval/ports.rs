//! Port interfaces for retrieval
//!
//! These traits define the boundaries between the retrieval engine and
//! infrastructure implementations.

use async_trait::async_trait;
use recordfetch_domain::{AuditEvent, RequestHeaders, ResolvedRequest};

use super::outcome::AttemptOutcome;

/// Performs exactly one HTTP call per invocation
///
/// Implementations enforce the connect, read and total timeouts and report
/// every failure as an [`AttemptOutcome`] value. Retrying is the caller's
/// job.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &ResolvedRequest) -> AttemptOutcome;
}

/// Supplies headers attached verbatim to every outgoing request
#[async_trait]
pub trait HeaderSource: Send + Sync {
    async fn headers(&self) -> RequestHeaders;
}

/// Receives one event per completed endpoint sequence
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Header source for backends that need no credentials
#[async_trait]
impl HeaderSource for RequestHeaders {
    async fn headers(&self) -> RequestHeaders {
        self.clone()
    }
}

/// Audit sink that discards events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: AuditEvent) {}
}
