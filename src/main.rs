//! Hooklet intake server binary.

use hooklet::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8080);
    let environment =
        std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let config = ServiceConfig::new()
        .host(host)
        .port(port)
        .environment(environment);

    tracing::info!("Starting hooklet intake server...");
    tracing::info!("Try: curl -X POST -d '{{\"message\":\"hello\"}}' http://localhost:{}/api/intake", config.port);
    tracing::info!("Discovery: curl http://localhost:{}/api/intake", config.port);
    tracing::info!("Health check: curl http://localhost:{}/api/health", config.port);

    IntakeServer::new(config).run().await
}
