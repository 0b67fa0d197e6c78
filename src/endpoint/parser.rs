//! Request body parser: classifies raw bytes as empty, malformed, or
//! valid JSON.

use crate::endpoint::handler::IntakeError;
use bytes::Bytes;
use serde_json::Value;

/// Parse an optional raw body into a JSON value.
///
/// Missing, empty, or whitespace-only bodies classify as
/// [`IntakeError::EmptyBody`]; anything else that fails decoding
/// classifies as [`IntakeError::MalformedJson`] carrying the decoder's
/// message. Any JSON type is accepted; no schema is enforced.
pub fn parse_body(body: Option<&Bytes>) -> Result<Value, IntakeError> {
    let raw = match body {
        Some(raw) => raw,
        None => return Err(IntakeError::EmptyBody),
    };

    let text = std::str::from_utf8(raw)
        .map_err(|err| IntakeError::MalformedJson(err.to_string()))?;

    if text.trim().is_empty() {
        return Err(IntakeError::EmptyBody);
    }

    serde_json::from_str(text).map_err(|err| IntakeError::MalformedJson(err.to_string()))
}
