//! Audit notification emitted once per completed endpoint sequence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outcome::EndpointOutcome;
use crate::errors::ErrorCategory;

/// Audit record for one endpoint sequence. Carries no payload, request body
/// or response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub run_id: Uuid,
    pub endpoint: String,
    pub http_status: u16,
    pub success: bool,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
}

impl AuditEvent {
    /// Audit record for one finished endpoint sequence
    pub fn from_outcome(run_id: Uuid, outcome: &EndpointOutcome) -> Self {
        Self {
            run_id,
            endpoint: outcome.endpoint.clone(),
            http_status: outcome.http_status,
            success: outcome.success,
            duration_ms: u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX),
            timestamp: outcome.finished_at,
            error_category: outcome.error_category,
        }
    }
}
