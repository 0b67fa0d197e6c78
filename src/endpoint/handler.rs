//! Endpoint trait, per-request context, and the intake error taxonomy.

use crate::http::{IntakeRequest, IntakeResponse, StatusCode};
use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Per-request execution context.
///
/// Carries the request id generated at request start and the start
/// instant used for processing-time reporting. One context lives for
/// exactly one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Opaque request id, unique per request.
    pub request_id: String,
    started: Instant,
}

impl RequestContext {
    /// Create a context with a freshly generated request id.
    pub fn new(prefix: &str) -> Self {
        Self {
            request_id: generate_request_id(prefix),
            started: Instant::now(),
        }
    }

    /// Create a context with a caller-supplied request id.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            started: Instant::now(),
        }
    }

    /// Time elapsed since the request started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed milliseconds since the request started.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Elapsed time formatted as a duration string, e.g. `12ms`.
    pub fn processing_time(&self) -> String {
        format!("{}ms", self.elapsed_ms())
    }
}

/// Generate a request id of the form `{prefix}_{millis}_{suffix}`.
///
/// Time-based with a random suffix; uniqueness is probabilistic, not
/// cryptographic.
fn generate_request_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("{}_{}_{}", prefix, millis, suffix)
}

/// An HTTP endpoint served by the intake runtime.
///
/// Endpoints are stateless across calls: every request arrives with its
/// own context and owns its payload exclusively.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Handle an incoming request and produce the response envelope.
    async fn handle(&self, request: IntakeRequest, ctx: &RequestContext) -> IntakeResponse;

    /// Endpoint name, also used as the request-id prefix.
    fn name(&self) -> &str;
}

/// Failures surfaced to callers as HTTP status + JSON error body.
///
/// None are silently dropped and none are retried; this is a synchronous
/// request/response surface with no retry queue.
#[derive(Debug, Clone, Error)]
pub enum IntakeError {
    /// Request body was missing, empty, or whitespace-only.
    #[error("request body is empty")]
    EmptyBody,

    /// Request body was present but not valid JSON.
    #[error("invalid JSON payload: {0}")]
    MalformedJson(String),

    /// Processing did not finish before the handler's time ceiling.
    #[error("processing timeout")]
    Timeout,

    /// Request body exceeded the configured size ceiling.
    #[error("request body exceeds limit of {limit} bytes")]
    Oversized { limit: usize },

    /// Catch-all for failures outside the normal parse path.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl IntakeError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::EmptyBody | IntakeError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            IntakeError::Timeout => StatusCode::REQUEST_TIMEOUT,
            IntakeError::Oversized { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IntakeError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeError::EmptyBody => "empty_body",
            IntakeError::MalformedJson(_) => "malformed_json",
            IntakeError::Timeout => "timeout",
            IntakeError::Oversized { .. } => "oversized",
            IntakeError::Unexpected(_) => "unexpected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_format() {
        let ctx = RequestContext::new("intake");
        let parts: Vec<&str> = ctx.request_id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "intake");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_request_ids_differ() {
        let first = RequestContext::new("intake");
        let second = RequestContext::new("intake");
        assert_ne!(first.request_id, second.request_id);
    }

    #[test]
    fn test_processing_time_is_duration_string() {
        let ctx = RequestContext::new("intake");
        let rendered = ctx.processing_time();
        assert!(rendered.ends_with("ms"));
        assert!(rendered.trim_end_matches("ms").parse::<u64>().is_ok());
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(IntakeError::EmptyBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            IntakeError::MalformedJson("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IntakeError::Timeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            IntakeError::Oversized { limit: 1024 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            IntakeError::Unexpected("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
