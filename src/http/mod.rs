//! HTTP request/response types shared by all intake endpoints.

mod request;
mod response;

pub use request::{IntakeRequest, Method};
pub use response::{IntakeResponse, StatusCode};
