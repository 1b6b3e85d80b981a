// Rust guideline compliant 2026-02-16

//! Shared domain types for the Eventum generation pipeline.
//!
//! Defines the timestamp/event data model, the error taxonomy, the `State`
//! port family, and the plugin-facing hexagonal ports (`InputPlugin`,
//! `EventPlugin`, `OutputSink`). All pipeline components depend on this
//! crate; no other crate is imported here.

pub mod errors;
pub mod ports;
pub mod state;
pub mod timestamp;

pub use errors::{
    ConfigError, Context, ExitCode, InitError, ProducerRuntimeError, RendererRuntimeError,
    UnexpectedError, WriterRuntimeError,
};
pub use ports::{EventContext, EventPlugin, InputPlugin, OutputSink};
pub use state::{State, StateError, TransactionalState};
pub use timestamp::{EventBatch, IdentifiedTimestamp, ProducerId, Tags, Timestamp, TimestampBatch};
