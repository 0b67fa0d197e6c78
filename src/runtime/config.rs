//! Service configuration.

use crate::endpoint::intake::Verbosity;
use std::time::Duration;

/// Configuration for the intake server.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Environment label reported by the health endpoint.
    pub environment: String,
    /// Ceiling for the intake parse/acknowledge race. Kept below the
    /// server's own request ceiling.
    pub handler_timeout: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Diagnostic verbosity for the intake endpoint.
    pub verbosity: Verbosity,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            handler_timeout: Duration::from_secs(25),
            max_body_size: 10 * 1024 * 1024, // 10MB
            verbosity: Verbosity::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the environment label.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the intake handler timeout.
    pub fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// Set the maximum request body size.
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Set the intake diagnostic verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
