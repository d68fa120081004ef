//! Outcome of a single HTTP attempt

use std::fmt;
use std::time::Duration;

use recordfetch_common::resilience::RetryClass;
use recordfetch_domain::{ErrorCategory, PayloadShape};
use serde_json::Value;

/// Which timeout fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutBoundary {
    Connect,
    Read,
    Total,
}

impl fmt::Display for TimeoutBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutBoundary::Connect => write!(f, "connect"),
            TimeoutBoundary::Read => write!(f, "read"),
            TimeoutBoundary::Total => write!(f, "total"),
        }
    }
}

/// Typed result of one call made by a
/// [`RequestExecutor`](super::ports::RequestExecutor)
///
/// Response bodies of failed calls are kept for diagnostics but never copied
/// into summaries.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// 2xx with a decoded body
    Success { status: u16, payload: Value },
    /// 4xx other than 429, or any other non-2xx/5xx final status
    ClientError { status: u16, body: String },
    /// 5xx
    ServerError { status: u16, body: String },
    /// 429 with the server-directed delay, if it sent a usable one
    RateLimited { retry_after: Option<Duration> },
    /// Connection-level failure; `cause` must not contain URLs or credentials
    NetworkError { cause: String },
    Timeout { boundary: TimeoutBoundary },
    /// Body could not be decoded or had the wrong structure
    Invalid { status: u16, reason: String },
}

impl AttemptOutcome {
    /// Whether the call returned a usable 2xx body
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Final HTTP status, or 0 if no response was received
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. }
            | Self::ClientError { status, .. }
            | Self::ServerError { status, .. }
            | Self::Invalid { status, .. } => *status,
            Self::RateLimited { .. } => 429,
            Self::NetworkError { .. } | Self::Timeout { .. } => 0,
        }
    }

    /// Failure category; `None` for success
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Success { .. } => None,
            Self::ClientError { .. } => Some(ErrorCategory::ClientError),
            Self::ServerError { .. } => Some(ErrorCategory::ServerError),
            Self::RateLimited { .. } => Some(ErrorCategory::RateLimited),
            Self::NetworkError { .. } => Some(ErrorCategory::NetworkError),
            Self::Timeout { .. } => Some(ErrorCategory::Timeout),
            Self::Invalid { .. } => Some(ErrorCategory::ValidationError),
        }
    }

    /// How the retry policy should treat this outcome
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Success { .. } => RetryClass::Success,
            Self::RateLimited { retry_after } => {
                RetryClass::RateLimited { retry_after: *retry_after }
            }
            Self::ServerError { .. } | Self::NetworkError { .. } | Self::Timeout { .. } => {
                RetryClass::Transient { reason: self.summary() }
            }
            Self::ClientError { .. } | Self::Invalid { .. } => RetryClass::Terminal,
        }
    }

    /// Human-readable, non-sensitive description
    pub fn summary(&self) -> String {
        match self {
            Self::Success { status, .. } => format!("OK ({status})"),
            Self::ClientError { status, .. } => format!("Client error ({status})"),
            Self::ServerError { status, .. } => format!("Server error ({status})"),
            Self::RateLimited { retry_after: Some(delay) } => {
                format!("Rate limited (429), retry after {}s", delay.as_secs())
            }
            Self::RateLimited { retry_after: None } => "Rate limited (429)".to_string(),
            Self::NetworkError { cause } => format!("Network error: {cause}"),
            Self::Timeout { boundary } => format!("Timed out ({boundary} timeout exceeded)"),
            Self::Invalid { reason, .. } => format!("Invalid response: {reason}"),
        }
    }

    /// Downgrade a success whose payload does not have `shape`
    pub fn check_shape(self, shape: PayloadShape) -> Self {
        match self {
            Self::Success { status, payload } if !shape.matches(&payload) => Self::Invalid {
                status,
                reason: format!("expected {shape} payload"),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn classification_follows_taxonomy() {
        let server = AttemptOutcome::ServerError { status: 503, body: String::new() };
        assert!(matches!(server.retry_class(), RetryClass::Transient { .. }));
        assert_eq!(server.category(), Some(ErrorCategory::ServerError));

        let missing = AttemptOutcome::ClientError { status: 404, body: "no such patient".into() };
        assert_eq!(missing.retry_class(), RetryClass::Terminal);
        assert_eq!(missing.category(), Some(ErrorCategory::ClientError));

        let invalid = AttemptOutcome::Invalid { status: 200, reason: "not JSON".into() };
        assert_eq!(invalid.retry_class(), RetryClass::Terminal);

        let limited = AttemptOutcome::RateLimited { retry_after: Some(Duration::from_secs(5)) };
        assert_eq!(
            limited.retry_class(),
            RetryClass::RateLimited { retry_after: Some(Duration::from_secs(5)) }
        );
        assert_eq!(limited.status(), 429);

        let timeout = AttemptOutcome::Timeout { boundary: TimeoutBoundary::Read };
        assert_eq!(timeout.status(), 0);
        assert!(matches!(timeout.retry_class(), RetryClass::Transient { .. }));
    }

    #[test]
    fn summary_never_includes_body() {
        let outcome =
            AttemptOutcome::ClientError { status: 401, body: "token abc123 expired".into() };

        assert_eq!(outcome.summary(), "Client error (401)");
    }

    #[test]
    fn shape_mismatch_becomes_invalid() {
        let outcome = AttemptOutcome::Success { status: 200, payload: json!({"PatNum": 7}) };

        let checked = outcome.check_shape(PayloadShape::Array);

        assert_eq!(checked.category(), Some(ErrorCategory::ValidationError));
        assert_eq!(checked.status(), 200);
        assert_eq!(checked.summary(), "Invalid response: expected array payload");
    }

    #[test]
    fn matching_shape_is_untouched() {
        let outcome = AttemptOutcome::Success { status: 200, payload: json!([]) };

        assert!(outcome.check_shape(PayloadShape::Array).is_success());
    }
}
