// Rust guideline compliant 2026-02-23

//! `opensearch` output sink (spec §4.6.2): indexes events into an
//! OpenSearch/Elasticsearch-compatible cluster, round-robining across the
//! configured hosts. A single-event batch goes through `_doc`; anything
//! larger is shipped through the `_bulk` NDJSON endpoint.

use domain::errors::context;
use domain::{EventBatch, InitError, OutputSink, WriterRuntimeError};
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpensearchSinkConfig {
    pub hosts: Vec<String>,
    pub index: String,
    pub basic_auth: Option<(String, String)>,
    pub request_timeout: Duration,
}

#[derive(Debug)]
pub struct OpensearchSink {
    client: Client,
    config: OpensearchSinkConfig,
    next_host: AtomicUsize,
}

impl OpensearchSink {
    /// # Errors
    ///
    /// Returns [`InitError`] if `config.hosts` is empty or the HTTP client
    /// fails to build.
    pub fn new(config: OpensearchSinkConfig) -> Result<Self, InitError> {
        if config.hosts.is_empty() {
            return Err(InitError {
                reason: "opensearch sink requires at least one host".to_owned(),
                context: context([]),
            });
        }
        let client = Client::builder().timeout(config.request_timeout).build().map_err(|e| InitError {
            reason: format!("failed to build opensearch sink client: {e}"),
            context: context([]),
        })?;
        Ok(Self { client, config, next_host: AtomicUsize::new(0) })
    }

    fn next_host_url(&self) -> &str {
        let i = self.next_host.fetch_add(1, Ordering::Relaxed) % self.config.hosts.len();
        &self.config.hosts[i]
    }

    async fn write_doc(&self, host: &str, event: &str) -> Result<(), WriterRuntimeError> {
        let url = format!("{host}/{}/_doc", self.config.index);
        let mut request = self.client.post(&url).header("content-type", "application/json").body(event.to_owned());
        if let Some((user, pass)) = &self.config.basic_auth {
            request = request.basic_auth(user, Some(pass));
        }
        let response = request.send().await.map_err(|e| WriterRuntimeError {
            reason: format!("opensearch sink request failed: {e}"),
            context: context([("url", &url)]),
        })?;
        if !response.status().is_success() {
            return Err(WriterRuntimeError {
                reason: format!("opensearch sink got status {}", response.status()),
                context: context([("url", &url)]),
            });
        }
        Ok(())
    }

    async fn write_bulk(&self, host: &str, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let url = format!("{host}/_bulk");
        let mut body = String::new();
        for event in batch.as_slice() {
            body.push_str(&format!(r#"{{"index":{{"_index":"{}"}}}}"#, self.config.index));
            body.push('\n');
            body.push_str(event);
            body.push('\n');
        }

        let mut request =
            self.client.post(&url).header("content-type", "application/x-ndjson").body(body);
        if let Some((user, pass)) = &self.config.basic_auth {
            request = request.basic_auth(user, Some(pass));
        }
        let response = request.send().await.map_err(|e| WriterRuntimeError {
            reason: format!("opensearch sink bulk request failed: {e}"),
            context: context([("url", &url)]),
        })?;
        if !response.status().is_success() {
            return Err(WriterRuntimeError {
                reason: format!("opensearch sink bulk request got status {}", response.status()),
                context: context([("url", &url)]),
            });
        }

        let payload: Value = response.json().await.map_err(|e| WriterRuntimeError {
            reason: format!("opensearch sink bulk response was not valid json: {e}"),
            context: context([("url", &url)]),
        })?;
        let errors = count_bulk_item_errors(&payload);
        if errors > 0 {
            return Err(WriterRuntimeError {
                reason: format!("opensearch sink bulk request had {errors} failed item(s)"),
                context: context([("url", &url)]),
            });
        }
        Ok(())
    }
}

impl OutputSink for OpensearchSink {
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let host = self.next_host_url();
        if batch.len() == 1 {
            self.write_doc(host, &batch.as_slice()[0]).await
        } else {
            self.write_bulk(host, batch).await
        }
    }
}

/// Counts failed items in a `_bulk` response body: each entry under
/// `items[]` carries one action key (`index`, `create`, ...) whose value has
/// an `error` field when that item failed.
fn count_bulk_item_errors(payload: &Value) -> usize {
    payload
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.as_object().is_some_and(|obj| obj.values().any(|action| action.get("error").is_some())))
                .count()
        })
        .unwrap_or(0)
}
