//! The intake endpoint: accepts JSON submissions, classifies them, and
//! acknowledges with a normalized response.
//!
//! One state machine parameterized by [`EndpointConfig`] serves every
//! variant: request start, body parsing raced against a timer, outcome
//! handling, response construction.

use crate::diag::{DiagnosticRecord, Emitter, ErrorDetail, Level};
use crate::endpoint::handler::{Endpoint, IntakeError, RequestContext};
use crate::endpoint::parser::parse_body;
use crate::endpoint::respond::{self, CorsPolicy};
use crate::http::{IntakeRequest, IntakeResponse, Method};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Optional payload fields echoed back in the acknowledgment, in
/// precedence order.
pub const ECHO_FIELDS: [&str; 4] = ["message", "input", "query", "action"];

/// How much the endpoint writes to the diagnostic sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Outcome records only.
    Minimal,
    /// Start, outcome, and end records.
    Standard,
    /// Standard plus request metadata on the start record.
    #[default]
    Diagnostic,
}

/// Configuration record for one intake endpoint instance.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Diagnostic verbosity.
    pub verbosity: Verbosity,
    /// CORS header set attached to responses.
    pub cors: CorsPolicy,
    /// Ceiling for the parse/acknowledge race, below the runtime's own
    /// request ceiling.
    pub timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            cors: CorsPolicy::default(),
            timeout: Duration::from_secs(25),
        }
    }
}

impl EndpointConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the CORS policy.
    pub fn cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    /// Set the processing timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The JSON intake endpoint.
pub struct IntakeEndpoint {
    config: EndpointConfig,
    emitter: Emitter,
}

impl IntakeEndpoint {
    /// Create an endpoint with the given config and emitter.
    pub fn new(config: EndpointConfig, emitter: Emitter) -> Self {
        Self { config, emitter }
    }

    /// Create an endpoint with defaults, emitting to stdout.
    pub fn with_defaults() -> Self {
        Self::new(EndpointConfig::default(), Emitter::stdout())
    }

    /// Run the intake state machine for a POST submission.
    async fn accept(&self, request: IntakeRequest, ctx: &RequestContext) -> IntakeResponse {
        self.emit_start(&request, ctx);

        // The body is owned by this request alone, so the race loser
        // cannot touch shared state after being ignored.
        let body = request.body;
        let work =
            tokio::spawn(async move { parse_body(body.as_ref()).map(|value| acknowledge(&value)) });

        let outcome = tokio::select! {
            joined = work => match joined {
                Ok(result) => result,
                Err(join_err) => Err(IntakeError::Unexpected(join_err.to_string())),
            },
            _ = tokio::time::sleep(self.config.timeout) => Err(IntakeError::Timeout),
        };

        let response = match &outcome {
            Ok(message) => {
                self.emit(
                    DiagnosticRecord::new(Level::Info, &ctx.request_id, "intake.accepted")
                        .with_elapsed_ms(ctx.elapsed_ms()),
                );
                respond::success(message, ctx, &self.config.cors)
            }
            Err(error) => {
                let event = match error {
                    IntakeError::Timeout => "intake.timeout",
                    IntakeError::EmptyBody | IntakeError::MalformedJson(_) => "intake.parse.failed",
                    _ => "intake.failed",
                };
                self.emit(
                    DiagnosticRecord::new(Level::Error, &ctx.request_id, event)
                        .with_error(ErrorDetail::new(error.kind(), error.to_string())),
                );
                respond::failure(error, ctx, &self.config.cors)
            }
        };

        self.emit_end(ctx);
        response
    }

    /// Static capability description returned on GET.
    fn discovery(&self, ctx: &RequestContext) -> IntakeResponse {
        let body = json!({
            "name": "hooklet intake endpoint",
            "description": "Accepts JSON submissions via POST and acknowledges them",
            "version": env!("CARGO_PKG_VERSION"),
            "status": "active",
            "capabilities": {
                "accepted_fields": ECHO_FIELDS,
                "content_type": "application/json",
            },
            "endpoints": {
                "intake": "/api/intake",
                "health": "/api/health",
                "spec": "/api/spec",
            },
            "cors": {
                "origin": self.config.cors.allow_origin,
                "methods": self.config.cors.allow_methods,
            },
        });
        match IntakeResponse::json(crate::http::StatusCode::OK, &body) {
            Ok(response) => self.config.cors.apply(
                response
                    .header("X-Request-ID", &ctx.request_id)
                    .header("X-Processing-Time", ctx.processing_time()),
            ),
            Err(_) => respond::failure(
                &IntakeError::Unexpected("discovery serialization failed".into()),
                ctx,
                &self.config.cors,
            ),
        }
    }

    fn reject_method(&self, request: &IntakeRequest, ctx: &RequestContext) -> IntakeResponse {
        self.emitter.emit(
            &DiagnosticRecord::new(Level::Warn, &ctx.request_id, "intake.method.rejected")
                .with_field("method", Value::String(request.method.to_string())),
        );
        respond::method_not_allowed("POST", ctx, &self.config.cors)
    }

    fn emit(&self, record: DiagnosticRecord) {
        self.emitter.emit(&record);
    }

    fn emit_start(&self, request: &IntakeRequest, ctx: &RequestContext) {
        if self.config.verbosity == Verbosity::Minimal {
            return;
        }
        let mut record =
            DiagnosticRecord::new(Level::Info, &ctx.request_id, "intake.request.received");
        if self.config.verbosity == Verbosity::Diagnostic {
            record = record
                .with_field("method", Value::String(request.method.to_string()))
                .with_field("path", Value::String(request.path.clone()))
                .with_field("header_count", json!(request.headers.len()))
                .with_field("body_length", json!(request.body_len()))
                .with_field(
                    "content_type",
                    header_or_none(request, "content-type"),
                )
                .with_field("origin", header_or_none(request, "origin"))
                .with_field("user_agent", header_or_none(request, "user-agent"));
        }
        self.emit(record);
    }

    fn emit_end(&self, ctx: &RequestContext) {
        if self.config.verbosity == Verbosity::Minimal {
            return;
        }
        self.emit(
            DiagnosticRecord::new(Level::Info, &ctx.request_id, "intake.request.completed")
                .with_elapsed_ms(ctx.elapsed_ms()),
        );
    }
}

#[async_trait]
impl Endpoint for IntakeEndpoint {
    async fn handle(&self, request: IntakeRequest, ctx: &RequestContext) -> IntakeResponse {
        match request.method {
            Method::Post => self.accept(request, ctx).await,
            Method::Get => self.discovery(ctx),
            Method::Options => {
                debug!("CORS preflight for {} [{}]", request.path, ctx.request_id);
                self.config.cors.preflight()
            }
            _ => self.reject_method(&request, ctx),
        }
    }

    fn name(&self) -> &str {
        "intake"
    }
}

fn header_or_none(request: &IntakeRequest, key: &str) -> Value {
    request
        .get_header(key)
        .map(|value| Value::String(value.clone()))
        .unwrap_or(Value::String("none".to_string()))
}

/// Derive the acknowledgment message from the first present echo field,
/// falling back to a generic acknowledgment.
fn acknowledge(payload: &Value) -> String {
    for field in ECHO_FIELDS {
        if let Some(text) = payload.get(field).and_then(Value::as_str) {
            return format!("Received {}: {}", field, text);
        }
    }
    "Payload received".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledge_echoes_first_known_field() {
        let payload = json!({"message": "hello"});
        assert_eq!(acknowledge(&payload), "Received message: hello");

        let payload = json!({"action": "report", "input": "details"});
        assert_eq!(acknowledge(&payload), "Received input: details");
    }

    #[test]
    fn test_acknowledge_defaults_for_unknown_shapes() {
        assert_eq!(acknowledge(&json!({})), "Payload received");
        assert_eq!(acknowledge(&json!([1, 2, 3])), "Payload received");
        assert_eq!(acknowledge(&json!({"message": 42})), "Payload received");
    }
}
