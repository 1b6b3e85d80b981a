// Rust guideline compliant 2026-02-23

//! Samples: static, indexable data loaded once at startup and exposed to
//! templates under `samples.<name>` (spec §4.5).

use domain::errors::context;
use domain::InitError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Declared source of one sample.
#[derive(Debug, Clone)]
pub enum SampleConfig {
    /// Items given directly in configuration.
    Items(Vec<Value>),
    /// Rows read from a CSV file.
    Csv { source: PathBuf, header: bool, delimiter: u8 },
    /// A JSON array read from a file.
    Json { source: PathBuf },
}

/// A loaded, indexable sample.
#[derive(Debug, Clone)]
pub struct Sample {
    rows: Vec<Value>,
}

impl Sample {
    /// # Errors
    ///
    /// Returns [`InitError`] if the source file cannot be read or does not
    /// parse as the declared format.
    pub fn load(config: &SampleConfig) -> Result<Self, InitError> {
        let rows = match config {
            SampleConfig::Items(items) => items.clone(),
            SampleConfig::Csv { source, header, delimiter } => Self::load_csv(source, *header, *delimiter)?,
            SampleConfig::Json { source } => Self::load_json(source)?,
        };
        Ok(Self { rows })
    }

    fn load_csv(source: &std::path::Path, header: bool, delimiter: u8) -> Result<Vec<Value>, InitError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(header)
            .delimiter(delimiter)
            .from_path(source)
            .map_err(|e| InitError {
                reason: format!("cannot open csv sample: {e}"),
                context: context([("source", &source.display().to_string())]),
            })?;

        if header {
            let headers = reader
                .headers()
                .map_err(|e| InitError { reason: format!("cannot read csv header: {e}"), context: context([]) })?
                .clone();
            reader
                .records()
                .map(|record| {
                    let record = record.map_err(|e| InitError {
                        reason: format!("cannot read csv record: {e}"),
                        context: context([("source", &source.display().to_string())]),
                    })?;
                    let map: serde_json::Map<String, Value> =
                        headers.iter().zip(record.iter()).map(|(k, v)| (k.to_owned(), Value::String(v.to_owned()))).collect();
                    Ok(Value::Object(map))
                })
                .collect()
        } else {
            reader
                .records()
                .map(|record| {
                    let record = record.map_err(|e| InitError {
                        reason: format!("cannot read csv record: {e}"),
                        context: context([("source", &source.display().to_string())]),
                    })?;
                    Ok(Value::Array(record.iter().map(|v| Value::String(v.to_owned())).collect()))
                })
                .collect()
        }
    }

    fn load_json(source: &std::path::Path) -> Result<Vec<Value>, InitError> {
        let text = std::fs::read_to_string(source).map_err(|e| InitError {
            reason: format!("cannot read json sample: {e}"),
            context: context([("source", &source.display().to_string())]),
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| InitError {
            reason: format!("cannot parse json sample: {e}"),
            context: context([("source", &source.display().to_string())]),
        })?;
        match value {
            Value::Array(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.rows
    }
}

/// Every sample declared for one event plugin, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    by_name: BTreeMap<String, Sample>,
}

impl Samples {
    /// # Errors
    ///
    /// Returns [`InitError`] if any declared sample fails to load.
    pub fn load(configs: &BTreeMap<String, SampleConfig>) -> Result<Self, InitError> {
        let mut by_name = BTreeMap::new();
        for (name, config) in configs {
            by_name.insert(name.clone(), Sample::load(config)?);
        }
        Ok(Self { by_name })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Sample> {
        self.by_name.get(name)
    }

    /// Borrow every sample's rows, keyed by name, for exposing to templates.
    #[must_use]
    pub fn as_value_map(&self) -> BTreeMap<&str, &[Value]> {
        self.by_name.iter().map(|(name, sample)| (name.as_str(), sample.as_slice())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Sample, SampleConfig};
    use serde_json::json;
    use std::io::Write as _;

    #[test]
    fn items_sample_is_indexable_in_declared_order() {
        let sample = Sample::load(&SampleConfig::Items(vec![json!("a"), json!("b")])).unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.get(0), Some(&json!("a")));
    }

    #[test]
    fn csv_sample_with_header_yields_objects() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,age").unwrap();
        writeln!(file, "Alice,30").unwrap();
        let sample = Sample::load(&SampleConfig::Csv {
            source: file.path().to_path_buf(),
            header: true,
            delimiter: b',',
        })
        .unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample.get(0).unwrap()["name"], json!("Alice"));
    }

    #[test]
    fn json_sample_reads_an_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"a":1}},{{"a":2}}]"#).unwrap();
        let sample = Sample::load(&SampleConfig::Json { source: file.path().to_path_buf() }).unwrap();
        assert_eq!(sample.len(), 2);
    }
}
