// Rust guideline compliant 2026-02-23

//! `null` output sink (spec §4.6.2): discards every batch. Useful for
//! throughput benchmarking the producer/render stages without any write
//! cost.

use domain::{EventBatch, OutputSink, WriterRuntimeError};

#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for NullSink {
    async fn write(&self, _batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::NullSink;
    use domain::{EventBatch, OutputSink as _};

    #[tokio::test]
    async fn discards_the_batch_without_error() {
        let sink = NullSink::new();
        let batch = EventBatch::new(vec!["a".to_owned()]);
        assert!(sink.write(&batch).await.is_ok());
    }
}
