//! Endpoint implementations and the trait seam they share.

pub mod apidoc;
pub mod handler;
pub mod health;
pub mod intake;
pub mod metrics;
pub mod parser;
pub mod respond;

pub use apidoc::SpecEndpoint;
pub use handler::{Endpoint, IntakeError, RequestContext};
pub use health::HealthEndpoint;
pub use intake::{EndpointConfig, IntakeEndpoint, Verbosity, ECHO_FIELDS};
pub use metrics::{FixedMetrics, MemoryUsage, RuntimeMetrics, SystemMetrics};
pub use parser::parse_body;
pub use respond::CorsPolicy;
