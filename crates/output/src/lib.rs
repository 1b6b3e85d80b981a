// Rust guideline compliant 2026-02-23

//! The output subsystem (spec §4.6): per-event and per-batch formatters,
//! plus a generic fan-out controller that presents formatted batches to
//! every configured sink under an ordering policy and a concurrency cap.
//!
//! Concrete sink adapters (stdout/stderr/file/http/opensearch/null) are not
//! defined here -- they implement `domain::OutputSink` in the binary crate,
//! the same split as the teacher's `Buffer1`/`Buffer2` adapters living
//! outside `producer`/`consumer`.

pub mod controller;
pub mod formatter;

pub use controller::{ControllerConfig, NamedSink, OutputController};
pub use formatter::{FormatOutcome, Formatter};
