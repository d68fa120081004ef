//! Per-endpoint outcome of one attempt sequence

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ErrorCategory;
use crate::utils::serde::duration_millis;

/// Result of one endpoint's attempt sequence. Created once per endpoint per
/// run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointOutcome {
    pub endpoint: String,
    /// Final HTTP status; 0 when no response was ever received
    pub http_status: u16,
    pub success: bool,
    /// Decoded response body for successful outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    /// Non-sensitive description of the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
    /// Attempts performed; 0 when the circuit rejected the call
    pub attempts: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "duration_millis", rename = "duration_ms")]
    pub duration: Duration,
}

impl EndpointOutcome {
    /// Successful outcome carrying `payload`.
    pub fn success(
        endpoint: impl Into<String>,
        http_status: u16,
        payload: serde_json::Value,
        attempts: u32,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_status,
            success: true,
            payload: Some(payload),
            error_category: None,
            error_summary: None,
            attempts,
            started_at,
            finished_at: finished_at(started_at, duration),
            duration,
        }
    }

    /// Failed outcome with its category and summary.
    pub fn failure(
        endpoint: impl Into<String>,
        http_status: u16,
        category: ErrorCategory,
        summary: impl Into<String>,
        attempts: u32,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_status,
            success: false,
            payload: None,
            error_category: Some(category),
            error_summary: Some(summary.into()),
            attempts,
            started_at,
            finished_at: finished_at(started_at, duration),
            duration,
        }
    }
}

fn finished_at(started_at: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration).map_or(started_at, |elapsed| started_at + elapsed)
}
