// Rust guideline compliant 2026-02-23

//! Process-wide metrics (spec §6, SPEC_FULL.md §C): a per-plugin gauge
//! refreshed on `metrics_interval`, aggregated into the shape a host reads
//! from the outside.

use domain::{EventBatch, OutputSink, WriterRuntimeError};
use output::Formatter;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One plugin instance's counters. Every field is an independent atomic so
/// producer threads, the renderer thread, and the output event loop can
/// each bump their own counters without a shared lock.
#[derive(Debug, Default)]
pub struct Gauge {
    produced: AtomicU64,
    produce_failed: AtomicU64,
    written: AtomicU64,
    write_failed: AtomicU64,
    format_failed: AtomicU64,
}

impl Gauge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_produced(&self, n: u64) {
        self.produced.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_produce_failed(&self, n: u64) {
        self.produce_failed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_written(&self, n: u64) {
        self.written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_write_failed(&self, n: u64) {
        self.write_failed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_format_failed(&self, n: u64) {
        self.format_failed.fetch_add(n, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> GaugeSnapshot {
        GaugeSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            produce_failed: self.produce_failed.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            write_failed: self.write_failed.load(Ordering::Relaxed),
            format_failed: self.format_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of a [`Gauge`], serialized into the metrics
/// document a host reads.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GaugeSnapshot {
    pub produced: u64,
    pub produce_failed: u64,
    pub written: u64,
    pub write_failed: u64,
    pub format_failed: u64,
}

/// One entry in `plugins.input`: static description, no per-batch counters
/// (the merger/batcher sit between producers and the renderer, so
/// production success is only observable at the renderer).
#[derive(Debug, Clone, Serialize)]
pub struct InputPluginMetrics {
    pub name: String,
    pub id: u16,
    pub configuration: serde_json::Value,
    pub created: String,
}

/// `plugins.event`: one gauge for the whole event plugin, plus a snapshot
/// of its three state scopes for operator visibility.
#[derive(Debug, Clone, Serialize)]
pub struct EventPluginMetrics {
    pub name: String,
    pub id: u16,
    pub configuration: serde_json::Value,
    pub produced: u64,
    pub produce_failed: u64,
    pub state: EventPluginStateMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPluginStateMetrics {
    pub locals: serde_json::Map<String, serde_json::Value>,
    pub shared: serde_json::Map<String, serde_json::Value>,
    pub globals: serde_json::Map<String, serde_json::Value>,
}

/// One entry in `plugins.output`.
#[derive(Debug, Clone, Serialize)]
pub struct OutputPluginMetrics {
    pub name: String,
    pub id: u16,
    pub configuration: serde_json::Value,
    pub written: u64,
    pub write_failed: u64,
    pub format_failed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommonMetrics {
    pub started: String,
    pub parameters: serde_json::Value,
}

/// The full document a host reads (spec §6 metrics shape).
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub common: CommonMetrics,
    pub input: Vec<InputPluginMetrics>,
    pub event: EventPluginMetrics,
    pub output: Vec<OutputPluginMetrics>,
}

/// Wraps one configured output sink with its own per-sink [`Formatter`] and
/// [`Gauge`], so one `OutputController` can fan a single rendered
/// `EventBatch` stream out to sinks that each declare a different output
/// format (spec §4.6.1-4.6.2).
pub struct FormattingSink<S> {
    formatter: Formatter,
    inner: S,
    gauge: Arc<Gauge>,
}

impl<S> FormattingSink<S> {
    pub fn new(formatter: Formatter, inner: S, gauge: Arc<Gauge>) -> Self {
        Self { formatter, inner, gauge }
    }
}

impl<S> std::fmt::Debug for FormattingSink<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormattingSink").field("formatter", &self.formatter).finish()
    }
}

impl<S: OutputSink> OutputSink for FormattingSink<S> {
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
        let outcome = self.formatter.format(batch);
        self.gauge.add_format_failed(outcome.failed as u64);
        if outcome.batch.is_empty() {
            return Ok(());
        }
        match self.inner.write(&outcome.batch).await {
            Ok(()) => {
                self.gauge.add_written(outcome.batch.len() as u64);
                Ok(())
            }
            Err(e) => {
                self.gauge.add_write_failed(outcome.batch.len() as u64);
                Err(e)
            }
        }
    }
}
