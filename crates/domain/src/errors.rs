//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for RecordFetch setup and configuration paths.
///
/// Per-endpoint runtime failures never surface as this type; they are carried
/// as [`ErrorCategory`] data inside an
/// [`EndpointOutcome`](crate::types::EndpointOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RecordFetchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for RecordFetch operations
pub type Result<T> = std::result::Result<T, RecordFetchError>;

/// Failure taxonomy for a single endpoint's attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Connection-level failure
    NetworkError,
    /// Connect, read or total timeout exceeded
    Timeout,
    /// 5xx response
    ServerError,
    /// 429 response
    RateLimited,
    /// 4xx response other than 429
    ClientError,
    /// Response body did not decode or match the expected structure
    ValidationError,
    /// Endpoint skipped because its circuit is open
    CircuitOpen,
}

impl ErrorCategory {
    /// Whether another attempt may succeed where this one failed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout | Self::ServerError | Self::RateLimited)
    }

    /// Stable label for logs and audit records.
    pub fn label(self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::ServerError => "server_error",
            Self::RateLimited => "rate_limited",
            Self::ClientError => "client_error",
            Self::ValidationError => "validation_error",
            Self::CircuitOpen => "circuit_open",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
