//! # Hooklet - JSON Intake Service
//!
//! Hooklet is a lightweight HTTP service that accepts arbitrary JSON
//! submissions on an intake endpoint, validates them, emits structured
//! diagnostic records, and returns a normalized acknowledgment.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        HTTP Runtime                            │
//! │        (accept loop, wire conversion, path routing)            │
//! └────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          Endpoints                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │    Intake    │   │    Health    │   │   API Spec   │        │
//! │  │ parse → ack  │   │ mem / uptime │   │ openapi doc  │        │
//! │  └──────┬───────┘   └──────────────┘   └──────────────┘        │
//! │         │                                                      │
//! │         ▼                                                      │
//! │  ┌──────────────┐                                              │
//! │  │ Diagnostics  │  one structured record line per event        │
//! │  └──────────────┘                                              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hooklet::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ServiceConfig::new().host("0.0.0.0").port(8080);
//!     IntakeServer::new(config).run().await
//! }
//! ```
//!
//! ## Request lifecycle
//!
//! 1. **Start**: a request id is generated and a start diagnostic emitted
//! 2. **Parse**: the body is classified (empty, malformed, valid JSON)
//!    while racing a fixed timer; the race loser is ignored, not aborted
//! 3. **Respond**: the outcome maps to a status, JSON body, and header
//!    set including `X-Request-ID` and `X-Processing-Time`
//!
//! Requests are fully isolated: no shared mutable state, no cache, no
//! cross-request coordination.

pub mod diag;
pub mod endpoint;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::diag::{DiagnosticRecord, Emitter, Level};
    pub use crate::endpoint::{
        CorsPolicy, Endpoint, EndpointConfig, HealthEndpoint, IntakeEndpoint, IntakeError,
        RequestContext, SpecEndpoint, Verbosity,
    };
    pub use crate::http::{IntakeRequest, IntakeResponse, Method, StatusCode};
    pub use crate::runtime::{IntakeServer, Router, ServiceConfig};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use diag::{DiagnosticRecord, Emitter};
pub use endpoint::{Endpoint, IntakeEndpoint, IntakeError, RequestContext};
pub use http::{IntakeRequest, IntakeResponse};
pub use runtime::{IntakeServer, ServiceConfig};
