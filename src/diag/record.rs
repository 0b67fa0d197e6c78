//! Structured diagnostic record model.
//!
//! One record is one line of structured output, tagged with level,
//! request id, and event name, suitable for external log aggregation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity level of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Detail about an error attached to a diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable error message.
    pub message: String,
    /// Stable machine-readable error kind.
    pub kind: String,
}

impl ErrorDetail {
    /// Create a new error detail.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
        }
    }
}

/// A single diagnostic record.
///
/// Write-once and append-only: records are emitted to an external sink
/// and never read back by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// RFC 3339 timestamp taken when the record was created.
    pub timestamp: String,
    /// Severity level.
    pub level: Level,
    /// Opaque request id, stable across all records for one request.
    pub request_id: String,
    /// Event name tag, e.g. `intake.accepted`.
    pub event: String,
    /// Optional structured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Optional elapsed time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    /// Optional error detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl DiagnosticRecord {
    /// Create a new record with the given level, request id, and event name.
    pub fn new(level: Level, request_id: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            level,
            request_id: request_id.into(),
            event: event.into(),
            data: None,
            elapsed_ms: None,
            error: None,
        }
    }

    /// Attach a structured data map.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a single data field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Attach an elapsed duration in milliseconds.
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    /// Attach an error detail.
    pub fn with_error(mut self, error: ErrorDetail) -> Self {
        self.error = Some(error);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_to_one_json_object() {
        let record = DiagnosticRecord::new(Level::Info, "intake_1_abc", "intake.accepted")
            .with_elapsed_ms(12)
            .with_field("method", Value::String("POST".into()));

        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains('\n'));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["request_id"], "intake_1_abc");
        assert_eq!(parsed["event"], "intake.accepted");
        assert_eq!(parsed["elapsed_ms"], 12);
        assert_eq!(parsed["data"]["method"], "POST");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let record = DiagnosticRecord::new(Level::Warn, "r", "intake.method.rejected");
        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains("data"));
        assert!(!line.contains("elapsed_ms"));
        assert!(!line.contains("error"));
    }

    #[test]
    fn test_error_detail_round_trip() {
        let record = DiagnosticRecord::new(Level::Error, "r", "intake.parse.failed")
            .with_error(ErrorDetail::new("malformed_json", "expected value at line 1"));

        let parsed: DiagnosticRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        let error = parsed.error.unwrap();
        assert_eq!(error.kind, "malformed_json");
        assert!(error.message.contains("expected value"));
    }
}
