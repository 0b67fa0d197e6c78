//! API description endpoint: serves the embedded OpenAPI document with
//! the server base URL substituted per request.

use crate::endpoint::handler::{Endpoint, RequestContext};
use crate::endpoint::respond::{self, CorsPolicy};
use crate::http::{IntakeRequest, IntakeResponse, Method, StatusCode};
use async_trait::async_trait;
use serde_json::{json, Value};

const OPENAPI_DOCUMENT: &str = include_str!("../../assets/openapi.json");

/// Endpoint serving the machine-readable API description.
pub struct SpecEndpoint {
    cors: CorsPolicy,
    fallback_host: String,
}

impl SpecEndpoint {
    /// Create a spec endpoint; `fallback_host` is used when the request
    /// carries no `host` header.
    pub fn new(fallback_host: impl Into<String>) -> Self {
        Self {
            cors: CorsPolicy::default(),
            fallback_host: fallback_host.into(),
        }
    }

    fn serve(&self, request: &IntakeRequest, ctx: &RequestContext) -> IntakeResponse {
        let mut document: Value = match serde_json::from_str(OPENAPI_DOCUMENT) {
            Ok(document) => document,
            Err(err) => {
                tracing::error!("Embedded API document failed to decode: {}", err);
                let body = json!({
                    "error": "Unable to load API specification",
                    "message": "The API description document could not be loaded",
                });
                return self.cors.apply(
                    IntakeResponse::json(StatusCode::INTERNAL_SERVER_ERROR, &body)
                        .unwrap_or_else(|_| {
                            IntakeResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                        }),
                );
            }
        };

        document["servers"] = json!([
            {
                "url": self.base_url(request),
                "description": "Current server",
            }
        ]);

        match IntakeResponse::json(StatusCode::OK, &document) {
            Ok(response) => self.cors.apply(
                response
                    .header("Cache-Control", "public, max-age=3600")
                    .header("X-API-Version", env!("CARGO_PKG_VERSION"))
                    .header("X-Request-ID", &ctx.request_id),
            ),
            Err(_) => self.cors.apply(IntakeResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
            )),
        }
    }

    /// Base URL derived from forwarding headers, defaulting to https.
    fn base_url(&self, request: &IntakeRequest) -> String {
        let proto = request
            .get_header("x-forwarded-proto")
            .map(String::as_str)
            .unwrap_or("https");
        let host = request
            .get_header("host")
            .map(String::as_str)
            .unwrap_or(&self.fallback_host);
        format!("{}://{}", proto, host)
    }
}

#[async_trait]
impl Endpoint for SpecEndpoint {
    async fn handle(&self, request: IntakeRequest, ctx: &RequestContext) -> IntakeResponse {
        match request.method {
            Method::Get => self.serve(&request, ctx),
            Method::Options => self.cors.preflight(),
            _ => respond::method_not_allowed("GET", ctx, &self.cors),
        }
    }

    fn name(&self) -> &str {
        "spec"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_substitution() {
        let endpoint = SpecEndpoint::new("localhost:8080");
        let ctx = RequestContext::new("spec");
        let request = IntakeRequest::new(Method::Get, "/api/spec")
            .header("x-forwarded-proto", "http")
            .header("Host", "example.com");

        let response = tokio_test::block_on(endpoint.handle(request, &ctx));
        assert_eq!(response.status, StatusCode::OK);

        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["servers"][0]["url"], "http://example.com");
        assert_eq!(body["openapi"], "3.0.3");
    }

    #[test]
    fn test_defaults_to_https_and_fallback_host() {
        let endpoint = SpecEndpoint::new("intake.internal");
        let ctx = RequestContext::new("spec");
        let request = IntakeRequest::new(Method::Get, "/api/spec");

        let response = tokio_test::block_on(endpoint.handle(request, &ctx));
        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["servers"][0]["url"], "https://intake.internal");
    }
}
