// Rust guideline compliant 2026-02-23

//! `file` output sink (spec §4.6.2): appends to a file with an
//! OS-appropriate line separator.

use domain::errors::context;
use domain::{EventBatch, InitError, OutputSink, WriterRuntimeError};
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// # Errors
    ///
    /// Returns [`InitError`] if `path` cannot be opened for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path).map_err(|e| InitError {
            reason: format!("failed to open output file: {e}"),
            context: context([("path", &path.display().to_string())]),
        })?;
        Ok(Self { path, file: Mutex::new(file) })
    }
}

impl OutputSink for FileSink {
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let mut file = self.file.lock().expect("file sink mutex poisoned");
        for event in batch.as_slice() {
            writeln!(file, "{event}").map_err(|e| WriterRuntimeError {
                reason: format!("failed to append output file: {e}"),
                context: context([("path", &self.path.display().to_string())]),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FileSink;
    use domain::{EventBatch, OutputSink as _};

    #[tokio::test]
    async fn appends_every_event_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let sink = FileSink::open(&path).unwrap();
        sink.write(&EventBatch::new(vec!["a".to_owned()])).await.unwrap();
        sink.write(&EventBatch::new(vec!["b".to_owned()])).await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a\nb\n");
    }
}
