// Rust guideline compliant 2026-02-23

//! `stderr` output sink (spec §4.6.2): line-delimited write to standard
//! error.

use domain::errors::context;
use domain::{EventBatch, OutputSink, WriterRuntimeError};
use std::io::Write as _;

#[derive(Debug, Default)]
pub struct StderrSink;

impl StderrSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for StderrSink {
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let mut stderr = std::io::stderr().lock();
        for event in batch.as_slice() {
            writeln!(stderr, "{event}")
                .map_err(|e| WriterRuntimeError { reason: format!("failed to write stderr: {e}"), context: context([]) })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StderrSink;
    use domain::{EventBatch, OutputSink as _};

    #[tokio::test]
    async fn writes_every_event_without_error() {
        let sink = StderrSink::new();
        let batch = EventBatch::new(vec!["a".to_owned()]);
        assert!(sink.write(&batch).await.is_ok());
    }
}
