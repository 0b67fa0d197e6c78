//! Response construction: CORS policy and the builders mapping outcomes
//! into response envelopes.

use crate::endpoint::handler::{IntakeError, RequestContext};
use crate::http::{IntakeResponse, StatusCode};
use serde_json::json;

/// Static CORS header set attached to every response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    /// Allowed origin, `*` by default.
    pub allow_origin: String,
    /// Comma-separated allowed methods.
    pub allow_methods: String,
    /// Comma-separated allowed request headers.
    pub allow_headers: String,
    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u32,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, OPTIONS".to_string(),
            allow_headers:
                "Content-Type, Authorization, Accept, Origin, X-Requested-With, X-API-Key"
                    .to_string(),
            max_age_secs: 86_400,
        }
    }
}

impl CorsPolicy {
    /// Render the policy onto a response.
    pub fn apply(&self, response: IntakeResponse) -> IntakeResponse {
        response
            .header("Access-Control-Allow-Origin", &self.allow_origin)
            .header("Access-Control-Allow-Methods", &self.allow_methods)
            .header("Access-Control-Allow-Headers", &self.allow_headers)
            .header("Access-Control-Max-Age", self.max_age_secs.to_string())
    }

    /// Build the bodyless preflight response.
    pub fn preflight(&self) -> IntakeResponse {
        self.apply(IntakeResponse::no_content())
    }
}

/// Attach the headers every terminal response carries.
fn finalize(
    response: IntakeResponse,
    ctx: &RequestContext,
    cors: &CorsPolicy,
) -> IntakeResponse {
    cors.apply(
        response
            .header("X-Request-ID", &ctx.request_id)
            .header("X-Processing-Time", ctx.processing_time()),
    )
}

/// JSON response with a fallback empty object if serialization fails.
fn json_response(status: StatusCode, body: &serde_json::Value) -> IntakeResponse {
    IntakeResponse::json(status, body).unwrap_or_else(|_| {
        IntakeResponse::new(status)
            .header("Content-Type", "application/json")
            .body("{}")
    })
}

/// Build the 200 acknowledgment for an accepted payload.
pub fn success(message: &str, ctx: &RequestContext, cors: &CorsPolicy) -> IntakeResponse {
    let body = json!({
        "status": "success",
        "message": message,
        "request_id": ctx.request_id,
        "processingTime": ctx.processing_time(),
    });
    finalize(json_response(StatusCode::OK, &body), ctx, cors)
}

/// Build the error response for a failed intake outcome.
pub fn failure(error: &IntakeError, ctx: &RequestContext, cors: &CorsPolicy) -> IntakeResponse {
    let status = error.status();
    let body = match error {
        IntakeError::Timeout => json!({
            "message": "processing timeout",
            "request_id": ctx.request_id,
        }),
        IntakeError::Unexpected(_) => json!({
            "status": "error",
            "message": "Error processing intake request",
            "error": error.to_string(),
            "request_id": ctx.request_id,
        }),
        _ => json!({
            "message": "Error processing intake request",
            "error": error.to_string(),
            "request_id": ctx.request_id,
            "processingTime": ctx.processing_time(),
        }),
    };
    finalize(json_response(status, &body), ctx, cors)
}

/// Build a 405 response naming the allowed method.
pub fn method_not_allowed(
    allow: &str,
    ctx: &RequestContext,
    cors: &CorsPolicy,
) -> IntakeResponse {
    let body = json!({
        "message": format!("Method not allowed. Only {} requests are accepted.", allow),
        "request_id": ctx.request_id,
    });
    finalize(json_response(StatusCode::METHOD_NOT_ALLOWED, &body), ctx, cors)
        .header("Allow", allow)
}

/// Build the 404 response for an unknown path.
pub fn not_found(path: &str, ctx: &RequestContext, cors: &CorsPolicy) -> IntakeResponse {
    let body = json!({
        "error": "Not found",
        "message": format!("No endpoint at {}", path),
        "request_id": ctx.request_id,
    });
    finalize(json_response(StatusCode::NOT_FOUND, &body), ctx, cors)
}
