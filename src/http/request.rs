//! Incoming HTTP request type used by intake endpoints.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP method enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            _ => Method::Get,
        }
    }
}

/// An inbound request as seen by an intake endpoint.
///
/// Header keys are stored lowercased so lookups are case-insensitive.
/// The request is created per HTTP call and discarded once the response
/// has been sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// HTTP headers, keys lowercased.
    pub headers: HashMap<String, String>,
    /// Raw request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Bytes>,
}

impl IntakeRequest {
    /// Create a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header value, matching case-insensitively.
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Length of the raw body in bytes.
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// Get the body as text if present.
    pub fn text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }
}

impl Default for IntakeRequest {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = IntakeRequest::new(Method::Post, "/api/intake")
            .header("Content-Type", "application/json");

        assert_eq!(
            request.get_header("content-type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            request.get_header("CONTENT-TYPE"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_body_len() {
        let request = IntakeRequest::new(Method::Post, "/").body("hello");
        assert_eq!(request.body_len(), 5);
        assert_eq!(IntakeRequest::default().body_len(), 0);
    }
}
