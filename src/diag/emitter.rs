//! Best-effort emitter writing diagnostic records to a sink.

use crate::diag::record::DiagnosticRecord;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Destination for serialized diagnostic lines.
///
/// A sink write must not fail the request path; implementations swallow
/// their own errors. Ordering across concurrent requests is whatever the
/// underlying stream provides for single line writes.
pub trait DiagnosticSink: Send + Sync {
    /// Write one serialized record line.
    fn write_line(&self, line: &str);
}

/// Sink writing one line per record to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", line);
    }
}

/// In-memory sink collecting lines, for tests and capture.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Parse each captured line back into a record.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn write_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Emitter serializing records and handing them to a sink.
///
/// Emitting never fails: serialization errors are swallowed and the
/// record is dropped.
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<dyn DiagnosticSink>,
}

impl Emitter {
    /// Create an emitter writing to stdout.
    pub fn stdout() -> Self {
        Self::with_sink(Arc::new(StdoutSink))
    }

    /// Create an emitter writing to the given sink.
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Emit a single record.
    pub fn emit(&self, record: &DiagnosticRecord) {
        if let Ok(line) = serde_json::to_string(record) {
            self.sink.write_line(&line);
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::record::Level;

    #[test]
    fn test_emit_writes_one_line_per_record() {
        let sink = Arc::new(MemorySink::new());
        let emitter = Emitter::with_sink(sink.clone());

        emitter.emit(&DiagnosticRecord::new(Level::Info, "r1", "intake.request.received"));
        emitter.emit(&DiagnosticRecord::new(Level::Info, "r1", "intake.request.completed"));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event, "intake.request.received");
        assert_eq!(records[1].event, "intake.request.completed");
    }
}
