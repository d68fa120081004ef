//! Aggregate of all endpoint outcomes for one retrieval run

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outcome::EndpointOutcome;
use crate::errors::ErrorCategory;

/// Process exit status derived from success/failure counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// Every endpoint succeeded
    Success,
    /// No endpoint succeeded
    Failure,
    /// Some endpoints succeeded, some failed
    Partial,
}

impl ExitStatus {
    /// Pure function of the two counts.
    pub fn from_counts(successful: usize, failed: usize) -> Self {
        if failed == 0 {
            Self::Success
        } else if successful == 0 {
            Self::Failure
        } else {
            Self::Partial
        }
    }

    /// Process exit code: 0 success, 1 failure, 2 partial
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

/// One failed endpoint, as rendered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub endpoint: String,
    pub category: ErrorCategory,
    pub summary: String,
    pub http_status: u16,
}

/// Final, read-only aggregate of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedResult {
    pub run_id: Uuid,
    /// Successful payloads keyed by endpoint name
    pub successes: BTreeMap<String, serde_json::Value>,
    /// Failures in endpoint configuration order
    pub failures: Vec<FailureRecord>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub status: ExitStatus,
    pub retrieved_at: DateTime<Utc>,
}

impl ConsolidatedResult {
    /// Fold outcomes into the aggregate. `outcomes` are expected in endpoint
    /// configuration order, one per configured endpoint.
    pub fn from_outcomes<I>(run_id: Uuid, outcomes: I) -> Self
    where
        I: IntoIterator<Item = EndpointOutcome>,
    {
        let mut successes = BTreeMap::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match (outcome.success, outcome.payload) {
                (true, Some(payload)) => {
                    successes.insert(outcome.endpoint, payload);
                }
                (true, None) => {
                    successes.insert(outcome.endpoint, serde_json::Value::Null);
                }
                (false, _) => failures.push(FailureRecord {
                    endpoint: outcome.endpoint,
                    category: outcome.error_category.unwrap_or(ErrorCategory::ValidationError),
                    summary: outcome.error_summary.unwrap_or_else(|| "unknown error".to_string()),
                    http_status: outcome.http_status,
                }),
            }
        }

        let successful = successes.len();
        let failed = failures.len();

        Self {
            run_id,
            successes,
            failures,
            total: successful + failed,
            successful,
            failed,
            status: ExitStatus::from_counts(successful, failed),
            retrieved_at: Utc::now(),
        }
    }

    /// Exit code for the run as a whole
    pub fn exit_code(&self) -> i32 {
        self.status.code()
    }

    /// Failure record for `endpoint`, if it failed
    pub fn failure_for(&self, endpoint: &str) -> Option<&FailureRecord> {
        self.failures.iter().find(|f| f.endpoint == endpoint)
    }

    /// Transform every successful payload (e.g. redaction) without touching
    /// counts or failures.
    #[must_use]
    pub fn map_successes<F>(mut self, mut f: F) -> Self
    where
        F: FnMut(&str, serde_json::Value) -> serde_json::Value,
    {
        self.successes = std::mem::take(&mut self.successes)
            .into_iter()
            .map(|(endpoint, payload)| {
                let transformed = f(&endpoint, payload);
                (endpoint, transformed)
            })
            .collect();
        self
    }
}
