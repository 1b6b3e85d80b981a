// Rust guideline compliant 2026-02-23

//! Event batch formatters (spec §4.6.1): turn a renderer-produced
//! `EventBatch` into a sequence of bytes-ready lines for a writer.
//!
//! Per-event modes (`plain`, `json`, `template`) format every event
//! independently and collect failures without aborting the batch; batch
//! modes (`json-batch`, `template-batch`, `eventum-http-input`) fold the
//! whole batch into a single output line.

use domain::errors::context;
use domain::{EventBatch, InitError};
use minijinja::Environment;
use serde_json::Value;

/// One formatted batch plus the count of events that failed to format.
#[derive(Debug, Clone)]
pub struct FormatOutcome {
    pub batch: EventBatch,
    pub failed: usize,
}

/// A configured formatter (spec §4.6.1 mode table).
pub enum Formatter {
    Plain,
    Json { indent: usize },
    JsonBatch { indent: usize },
    Template { env: Environment<'static> },
    TemplateBatch { env: Environment<'static> },
    EventumHttpInput,
}

impl std::fmt::Debug for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Plain => "Plain",
            Self::Json { .. } => "Json",
            Self::JsonBatch { .. } => "JsonBatch",
            Self::Template { .. } => "Template",
            Self::TemplateBatch { .. } => "TemplateBatch",
            Self::EventumHttpInput => "EventumHttpInput",
        };
        f.debug_tuple("Formatter").field(&name).finish()
    }
}

const TEMPLATE_NAME: &str = "output";

impl Formatter {
    #[must_use]
    pub fn plain() -> Self {
        Self::Plain
    }

    #[must_use]
    pub fn json(indent: usize) -> Self {
        Self::Json { indent }
    }

    #[must_use]
    pub fn json_batch(indent: usize) -> Self {
        Self::JsonBatch { indent }
    }

    /// # Errors
    ///
    /// Returns [`InitError`] if `source` fails to parse as a jinja template.
    pub fn template(source: &str) -> Result<Self, InitError> {
        Ok(Self::Template { env: build_env(source)? })
    }

    /// # Errors
    ///
    /// Returns [`InitError`] if `source` fails to parse as a jinja template.
    pub fn template_batch(source: &str) -> Result<Self, InitError> {
        Ok(Self::TemplateBatch { env: build_env(source)? })
    }

    #[must_use]
    pub fn eventum_http_input() -> Self {
        Self::EventumHttpInput
    }

    /// Format `batch`, collecting per-event failures rather than aborting.
    #[must_use]
    pub fn format(&self, batch: &EventBatch) -> FormatOutcome {
        match self {
            Self::Plain => FormatOutcome { batch: batch.clone(), failed: 0 },
            Self::Json { indent } => format_per_event(batch, |event| format_json(event, *indent)),
            Self::JsonBatch { indent } => format_json_batch(batch, *indent),
            Self::Template { env } => format_per_event(batch, |event| render_event(env, event)),
            Self::TemplateBatch { env } => format_template_batch(env, batch),
            Self::EventumHttpInput => {
                FormatOutcome { batch: EventBatch::new(vec![format!(r#"{{"count": {}}}"#, batch.len())]), failed: 0 }
            }
        }
    }
}

fn build_env(source: &str) -> Result<Environment<'static>, InitError> {
    let mut env = Environment::new();
    env.add_template_owned(TEMPLATE_NAME, source.to_owned()).map_err(|e| InitError {
        reason: format!("failed to parse output template: {e}"),
        context: context([]),
    })?;
    Ok(env)
}

fn format_per_event(batch: &EventBatch, format_one: impl Fn(&str) -> Result<String, String>) -> FormatOutcome {
    let mut formatted = Vec::with_capacity(batch.len());
    let mut failed = 0;
    for event in batch.as_slice() {
        match format_one(event) {
            Ok(line) => formatted.push(line),
            Err(reason) => {
                log::warn!("output.format.failed: reason={reason} event={event}");
                failed += 1;
            }
        }
    }
    FormatOutcome { batch: EventBatch::new(formatted), failed }
}

fn format_json(event: &str, indent: usize) -> Result<String, String> {
    let value: Value = serde_json::from_str(event).map_err(|e| e.to_string())?;
    pretty(&value, indent).map_err(|e| e.to_string())
}

fn render_event(env: &Environment<'_>, event: &str) -> Result<String, String> {
    let template = env.get_template(TEMPLATE_NAME).map_err(|e| e.to_string())?;
    template.render(minijinja::context! { event => event }).map_err(|e| e.to_string())
}

fn format_json_batch(batch: &EventBatch, indent: usize) -> FormatOutcome {
    let mut values = Vec::with_capacity(batch.len());
    let mut failed = 0;
    for event in batch.as_slice() {
        match serde_json::from_str::<Value>(event) {
            Ok(value) => values.push(value),
            Err(e) => {
                log::warn!("output.format.failed: reason={e} event={event}");
                failed += 1;
            }
        }
    }
    let rendered = pretty(&Value::Array(values), indent).unwrap_or_else(|_| "[]".to_owned());
    FormatOutcome { batch: EventBatch::new(vec![rendered]), failed }
}

fn format_template_batch(env: &Environment<'_>, batch: &EventBatch) -> FormatOutcome {
    let template = match env.get_template(TEMPLATE_NAME) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("output.format.failed: reason={e}");
            return FormatOutcome { batch: EventBatch::default(), failed: batch.len() };
        }
    };
    match template.render(minijinja::context! { events => batch.as_slice() }) {
        Ok(rendered) => FormatOutcome { batch: EventBatch::new(vec![rendered]), failed: 0 },
        Err(e) => {
            log::warn!("output.format.failed: reason={e}");
            FormatOutcome { batch: EventBatch::default(), failed: batch.len() }
        }
    }
}

fn pretty(value: &Value, indent: usize) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(value, &mut ser)?;
    Ok(String::from_utf8(buf).expect("serde_json only emits valid utf-8"))
}
