// Rust guideline compliant 2026-07-28

//! `http` output sink (spec §4.6.2): one request per batch. Any status
//! other than the configured `expected_status` is reported as a writer
//! runtime error for that batch.

use domain::errors::context;
use domain::{EventBatch, InitError, OutputSink, WriterRuntimeError};
use reqwest::{Client, Identity, Method, Proxy};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    pub url: String,
    pub method: Method,
    pub expected_status: u16,
    pub headers: BTreeMap<String, String>,
    pub basic_auth: Option<(String, String)>,
    pub client_cert: Option<PathBuf>,
    pub client_cert_key: Option<PathBuf>,
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug)]
pub struct HttpSink {
    client: Client,
    config: HttpSinkConfig,
}

impl HttpSink {
    /// # Errors
    ///
    /// Returns [`InitError`] if the client certificate/key can't be read or
    /// parsed, the proxy URL is malformed, or the underlying HTTP client
    /// otherwise fails to build.
    pub fn new(config: HttpSinkConfig) -> Result<Self, InitError> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout).timeout(config.request_timeout);

        if let Some(identity) = build_identity(config.client_cert.as_deref(), config.client_cert_key.as_deref())? {
            builder = builder.identity(identity);
        }

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| InitError { reason: format!("invalid proxy url `{proxy_url}`: {e}"), context: context([]) })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| InitError { reason: format!("failed to build http sink client: {e}"), context: context([]) })?;
        Ok(Self { client, config })
    }
}

fn build_identity(cert: Option<&std::path::Path>, key: Option<&std::path::Path>) -> Result<Option<Identity>, InitError> {
    let (Some(cert), Some(key)) = (cert, key) else { return Ok(None) };

    let mut pem = std::fs::read(cert)
        .map_err(|e| InitError { reason: format!("failed to read client cert {}: {e}", cert.display()), context: context([]) })?;
    let key_pem = std::fs::read(key)
        .map_err(|e| InitError { reason: format!("failed to read client cert key {}: {e}", key.display()), context: context([]) })?;
    pem.extend_from_slice(&key_pem);

    Identity::from_pem(&pem)
        .map(Some)
        .map_err(|e| InitError { reason: format!("invalid client certificate: {e}"), context: context([]) })
}

impl OutputSink for HttpSink {
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let body = batch.as_slice().join("\n");
        let mut request = self.client.request(self.config.method.clone(), &self.config.url).body(body);
        for (name, value) in &self.config.headers {
            request = request.header(name, value);
        }
        if let Some((user, pass)) = &self.config.basic_auth {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(|e| WriterRuntimeError {
            reason: format!("http sink request failed: {e}"),
            context: context([("url", &self.config.url)]),
        })?;

        let status = response.status().as_u16();
        if status != self.config.expected_status {
            return Err(WriterRuntimeError {
                reason: format!("http sink got status {status}, expected {}", self.config.expected_status),
                context: context([("url", &self.config.url)]),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpSink, HttpSinkConfig};
    use domain::{EventBatch, OutputSink as _};
    use reqwest::Method;
    use std::collections::BTreeMap;
    use std::time::Duration;

    #[tokio::test]
    async fn reports_unexpected_status_as_a_writer_error() {
        // No server is listening on this port; the connection itself fails,
        // which the sink reports the same way as an unexpected status.
        let sink = HttpSink::new(HttpSinkConfig {
            url: "http://127.0.0.1:1".to_owned(),
            method: Method::POST,
            expected_status: 200,
            headers: BTreeMap::new(),
            basic_auth: None,
            client_cert: None,
            client_cert_key: None,
            proxy: None,
            connect_timeout: Duration::from_millis(200),
            request_timeout: Duration::from_millis(200),
        })
        .unwrap();
        let batch = EventBatch::new(vec!["x".to_owned()]);
        assert!(sink.write(&batch).await.is_err());
    }
}
