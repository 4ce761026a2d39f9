// Pipeline module
// Engine facade over detection and rendering, plus the run trace

pub mod engine;
pub mod trace;

pub use engine::{process, ProcessError, ProcessOutput};
pub use trace::{read_trace_file, TraceBuilder, TraceEntry, TraceError, TraceWriter};
