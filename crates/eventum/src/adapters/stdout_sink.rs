// Rust guideline compliant 2026-02-23

//! `stdout` output sink (spec §4.6.2): line-delimited write to standard
//! output.

use domain::errors::context;
use domain::{EventBatch, OutputSink, WriterRuntimeError};
use std::io::Write as _;

#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for StdoutSink {
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let mut stdout = std::io::stdout().lock();
        for event in batch.as_slice() {
            writeln!(stdout, "{event}")
                .map_err(|e| WriterRuntimeError { reason: format!("failed to write stdout: {e}"), context: context([]) })?;
        }
        Ok(())
    }
}
