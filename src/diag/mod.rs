//! Diagnostics: structured per-request records and the emitter that
//! writes them to an external log sink.

mod emitter;
mod record;

pub use emitter::{DiagnosticSink, Emitter, MemorySink, StdoutSink};
pub use record::{DiagnosticRecord, ErrorDetail, Level};
