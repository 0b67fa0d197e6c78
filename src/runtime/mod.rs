//! The intake HTTP runtime: server loop, routing, and configuration.

mod config;
mod server;

pub use config::ServiceConfig;
pub use server::{IntakeServer, Router};
