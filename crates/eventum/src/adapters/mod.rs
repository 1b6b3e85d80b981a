// Rust guideline compliant 2026-02-23

//! Concrete `domain::OutputSink` adapters (spec §4.6.2).
//!
//! Living in the binary rather than the `output` crate, the same split as
//! the teacher's `Buffer1`/`Buffer2` implementations sitting outside
//! `producer`/`consumer`.

mod file_sink;
mod http_sink;
mod null_sink;
mod opensearch_sink;
mod stderr_sink;
mod stdout_sink;

pub use file_sink::FileSink;
pub use http_sink::{HttpSink, HttpSinkConfig};
pub use null_sink::NullSink;
pub use opensearch_sink::{OpensearchSink, OpensearchSinkConfig};
pub use stderr_sink::StderrSink;
pub use stdout_sink::StdoutSink;
