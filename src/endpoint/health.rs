//! Health endpoint: maps process memory/uptime thresholds to a
//! healthy/degraded report.

use crate::diag::{DiagnosticRecord, Emitter, Level};
use crate::endpoint::handler::{Endpoint, RequestContext};
use crate::endpoint::metrics::RuntimeMetrics;
use crate::endpoint::respond::{self, CorsPolicy};
use crate::http::{IntakeRequest, IntakeResponse, Method, StatusCode};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// RSS above this marks the memory check as `warning`.
pub const MEMORY_WARN_THRESHOLD_BYTES: u64 = 512 * 1024 * 1024;

/// Memory portion of the health report.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryCheck {
    /// `healthy` or `warning`.
    pub status: &'static str,
    /// Resident set size in bytes.
    pub rss_bytes: u64,
    /// Virtual memory size in bytes.
    pub virtual_bytes: u64,
}

/// Uptime portion of the health report.
#[derive(Debug, Clone, Serialize)]
pub struct UptimeCheck {
    /// `healthy` or `error`.
    pub status: &'static str,
    /// Uptime in whole seconds.
    pub seconds: u64,
    /// Uptime rendered as `XhYmZs`.
    pub readable: String,
}

/// The full check set returned in the health body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub api: &'static str,
    pub memory: MemoryCheck,
    pub uptime: UptimeCheck,
    pub environment: String,
}

/// The liveness endpoint.
pub struct HealthEndpoint {
    metrics: Arc<dyn RuntimeMetrics>,
    emitter: Emitter,
    cors: CorsPolicy,
    environment: String,
}

impl HealthEndpoint {
    /// Create a health endpoint over the given metrics provider.
    pub fn new(
        metrics: Arc<dyn RuntimeMetrics>,
        emitter: Emitter,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            metrics,
            emitter,
            cors: CorsPolicy::default(),
            environment: environment.into(),
        }
    }

    /// Gather checks from the metrics provider.
    fn checks(&self) -> HealthChecks {
        let memory = self.metrics.memory();
        let uptime = self.metrics.uptime().as_secs();

        HealthChecks {
            api: "healthy",
            memory: MemoryCheck {
                status: if memory.rss_bytes < MEMORY_WARN_THRESHOLD_BYTES {
                    "healthy"
                } else {
                    "warning"
                },
                rss_bytes: memory.rss_bytes,
                virtual_bytes: memory.virtual_bytes,
            },
            uptime: UptimeCheck {
                status: if uptime > 0 { "healthy" } else { "error" },
                seconds: uptime,
                readable: format_uptime(uptime),
            },
            environment: self.environment.clone(),
        }
    }

    fn report(&self, ctx: &RequestContext) -> IntakeResponse {
        let checks = self.checks();
        // A memory warning does not degrade overall health.
        let healthy = checks.api == "healthy" && checks.uptime.status == "healthy";

        let status = if healthy { "healthy" } else { "degraded" };
        let body = json!({
            "status": status,
            "timestamp": Utc::now().to_rfc3339(),
            "request_id": ctx.request_id,
            "processingTime": ctx.processing_time(),
            "checks": checks,
            "version": env!("CARGO_PKG_VERSION"),
            "service": "hooklet",
        });

        self.emitter.emit(
            &DiagnosticRecord::new(Level::Info, &ctx.request_id, "health.checked")
                .with_field("status", json!(status))
                .with_elapsed_ms(ctx.elapsed_ms()),
        );

        let http_status = if healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        match IntakeResponse::json(http_status, &body) {
            Ok(response) => response
                .header("X-Request-ID", &ctx.request_id)
                .header("X-Processing-Time", ctx.processing_time())
                .header("Cache-Control", "no-cache, no-store, must-revalidate"),
            Err(_) => IntakeResponse::new(StatusCode::SERVICE_UNAVAILABLE)
                .header("Content-Type", "application/json")
                .header("X-Request-ID", &ctx.request_id)
                .body(r#"{"status":"error"}"#),
        }
    }
}

#[async_trait]
impl Endpoint for HealthEndpoint {
    async fn handle(&self, request: IntakeRequest, ctx: &RequestContext) -> IntakeResponse {
        match request.method {
            Method::Get => self.report(ctx),
            Method::Options => self.cors.preflight(),
            _ => respond::method_not_allowed("GET", ctx, &self.cors),
        }
    }

    fn name(&self) -> &str {
        "health"
    }
}

/// Render whole seconds as `XhYmZs`.
fn format_uptime(seconds: u64) -> String {
    format!(
        "{}h {}m {}s",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::MemorySink;
    use crate::endpoint::metrics::{FixedMetrics, MemoryUsage};
    use serde_json::Value;
    use std::time::Duration;

    fn endpoint(metrics: FixedMetrics) -> HealthEndpoint {
        HealthEndpoint::new(
            Arc::new(metrics),
            Emitter::with_sink(Arc::new(MemorySink::new())),
            "test",
        )
    }

    fn get(endpoint: &HealthEndpoint) -> IntakeResponse {
        let ctx = RequestContext::new("health");
        tokio_test::block_on(
            endpoint.handle(IntakeRequest::new(Method::Get, "/api/health"), &ctx),
        )
    }

    #[test]
    fn test_healthy_process_reports_200() {
        let response = get(&endpoint(FixedMetrics {
            memory: MemoryUsage {
                rss_bytes: 64 * 1024 * 1024,
                virtual_bytes: 128 * 1024 * 1024,
            },
            uptime: Duration::from_secs(3725),
        }));

        assert_eq!(response.status, StatusCode::OK);
        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"]["memory"]["status"], "healthy");
        assert_eq!(body["checks"]["uptime"]["readable"], "1h 2m 5s");
    }

    #[test]
    fn test_memory_warning_does_not_degrade() {
        let response = get(&endpoint(FixedMetrics {
            memory: MemoryUsage {
                rss_bytes: MEMORY_WARN_THRESHOLD_BYTES + 1,
                virtual_bytes: 0,
            },
            uptime: Duration::from_secs(10),
        }));

        assert_eq!(response.status, StatusCode::OK);
        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"]["memory"]["status"], "warning");
    }

    #[test]
    fn test_zero_uptime_degrades_to_503() {
        let response = get(&endpoint(FixedMetrics {
            memory: MemoryUsage::default(),
            uptime: Duration::ZERO,
        }));

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["uptime"]["status"], "error");
    }

    #[test]
    fn test_post_is_rejected_with_allow_get() {
        let endpoint = endpoint(FixedMetrics {
            memory: MemoryUsage::default(),
            uptime: Duration::from_secs(1),
        });
        let ctx = RequestContext::new("health");
        let response = tokio_test::block_on(
            endpoint.handle(IntakeRequest::new(Method::Post, "/api/health"), &ctx),
        );

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.get_header("Allow"), Some(&"GET".to_string()));
    }
}
