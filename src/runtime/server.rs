//! HTTP server: accept loop, wire conversion, and path routing.

use crate::diag::Emitter;
use crate::endpoint::handler::{Endpoint, IntakeError, RequestContext};
use crate::endpoint::respond::{self, CorsPolicy};
use crate::endpoint::{
    EndpointConfig, HealthEndpoint, IntakeEndpoint, SpecEndpoint, SystemMetrics,
};
use crate::http::{IntakeRequest, IntakeResponse, Method};
use crate::runtime::ServiceConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Exact-path route table over boxed endpoints.
///
/// Dispatch creates the per-request context, enforces the body-size
/// ceiling, and hands the request to the matching endpoint. Unknown
/// paths produce a JSON 404.
pub struct Router {
    routes: HashMap<String, Arc<dyn Endpoint>>,
    max_body_size: usize,
    cors: CorsPolicy,
}

impl Router {
    /// Create an empty router with the given body-size ceiling.
    pub fn new(max_body_size: usize) -> Self {
        Self {
            routes: HashMap::new(),
            max_body_size,
            cors: CorsPolicy::default(),
        }
    }

    /// Mount an endpoint at an exact path.
    pub fn route(mut self, path: impl Into<String>, endpoint: Arc<dyn Endpoint>) -> Self {
        self.routes.insert(path.into(), endpoint);
        self
    }

    /// Dispatch a request to its endpoint.
    pub async fn dispatch(&self, request: IntakeRequest) -> IntakeResponse {
        let endpoint = match self.routes.get(&request.path) {
            Some(endpoint) => endpoint,
            None => {
                let ctx = RequestContext::new("request");
                warn!("No endpoint at {} [{}]", request.path, ctx.request_id);
                return respond::not_found(&request.path, &ctx, &self.cors);
            }
        };

        let ctx = RequestContext::new(endpoint.name());
        debug!(
            "Dispatching {} {} [{}]",
            request.method, request.path, ctx.request_id
        );

        if request.body_len() > self.max_body_size {
            let error = IntakeError::Oversized {
                limit: self.max_body_size,
            };
            warn!("{} [{}]", error, ctx.request_id);
            return respond::failure(&error, &ctx, &self.cors);
        }

        endpoint.handle(request, &ctx).await
    }
}

/// The intake HTTP server.
///
/// Each inbound connection is served on its own task; handlers are
/// stateless across calls, so requests are fully isolated.
pub struct IntakeServer {
    config: ServiceConfig,
    router: Arc<Router>,
}

impl IntakeServer {
    /// Create a server with the standard endpoint set mounted.
    pub fn new(config: ServiceConfig) -> Self {
        let emitter = Emitter::stdout();
        let intake = IntakeEndpoint::new(
            EndpointConfig::new()
                .verbosity(config.verbosity)
                .timeout(config.handler_timeout),
            emitter.clone(),
        );
        let health = HealthEndpoint::new(
            Arc::new(SystemMetrics::new()),
            emitter,
            config.environment.clone(),
        );
        let spec = SpecEndpoint::new(config.bind_addr());

        let router = Router::new(config.max_body_size)
            .route("/api/intake", Arc::new(intake) as Arc<dyn Endpoint>)
            .route("/api/health", Arc::new(health) as Arc<dyn Endpoint>)
            .route("/api/spec", Arc::new(spec) as Arc<dyn Endpoint>);

        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Create a server over a caller-assembled router.
    pub fn with_router(config: ServiceConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Start the HTTP server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Intake server listening on {}", addr);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let router = self.router.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let router = router.clone();
                    async move { serve_request(req, router, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle one wire request: convert, dispatch, convert back.
async fn serve_request(
    req: Request<Incoming>,
    router: Arc<Router>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    debug!(
        "Handling request: {} {} from {}",
        req.method(),
        req.uri().path(),
        remote_addr
    );

    let request = match convert_request(req).await {
        Ok(request) => request,
        Err(err) => {
            warn!("Failed to read request: {}", err);
            let ctx = RequestContext::new("request");
            let error = IntakeError::Unexpected(err.to_string());
            return Ok(build_response(respond::failure(
                &error,
                &ctx,
                &CorsPolicy::default(),
            )));
        }
    };

    Ok(build_response(router.dispatch(request).await))
}

/// Convert a hyper request to an [`IntakeRequest`].
async fn convert_request(
    req: Request<Incoming>,
) -> Result<IntakeRequest, Box<dyn std::error::Error + Send + Sync>> {
    let method = Method::from(req.method());
    let path = req.uri().path().to_string();

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    let body_bytes = req.collect().await?.to_bytes();
    let body = if body_bytes.is_empty() {
        None
    } else {
        Some(body_bytes)
    };

    Ok(IntakeRequest {
        method,
        path,
        headers,
        body,
    })
}

/// Build a hyper response from an [`IntakeResponse`].
fn build_response(response: IntakeResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);

    for (name, value) in response.headers {
        builder = builder.header(name, value);
    }

    let body = response.body.unwrap_or_default();
    builder.body(Full::new(body)).unwrap()
}
