//! Audit sink that writes events to the `audit` tracing target

use async_trait::async_trait;
use recordfetch_core::AuditSink;
use recordfetch_domain::constants::AUDIT_TARGET;
use recordfetch_domain::AuditEvent;

/// Emits one structured event per endpoint sequence. Persistence is left to
/// whatever subscriber layer consumes the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        let category = event.error_category.map(|c| c.label());
        tracing::info!(
            target: AUDIT_TARGET,
            run_id = %event.run_id,
            endpoint = %event.endpoint,
            http_status = event.http_status,
            success = event.success,
            duration_ms = event.duration_ms,
            timestamp = %event.timestamp.to_rfc3339(),
            error_category = category,
            "endpoint retrieval"
        );
    }
}
