// Rust guideline compliant 2026-02-23

//! Output fan-out controller (spec §4.6.3-4.6.4, §5 ordering): presents
//! each formatted batch to every configured sink, honoring an ordering
//! policy and a process-wide concurrency cap.
//!
//! Generic over `domain::OutputSink` like the teacher's `Consumer` is
//! generic over its buffer/modelizer ports -- this crate carries no
//! concrete sink logic, only the fan-out shape. One dedicated `tokio` task
//! per sink drains that sink's own bounded channel in arrival order, so a
//! slow sink only ever falls behind on its own queue (spec §5 "each
//! individual sink still observes batches in the order they leave the
//! renderer").

use domain::{EventBatch, OutputSink, WriterRuntimeError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

/// Runtime configuration for an [`OutputController`].
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// If set, the controller awaits every sink's completion for batch `k`
    /// before accepting batch `k+1` (spec §5 ordering, `keep_order=true`).
    pub keep_order: bool,
    /// Upper bound on in-flight write operations across every sink.
    pub max_concurrency: usize,
    /// Per-sink channel depth when `keep_order` is false.
    pub queue_depth: usize,
}

/// Object-safe wrapper over `domain::OutputSink`.
///
/// `OutputSink::write` is a native `async fn`, which keeps the port
/// dyn-incompatible by design (see its doc comment); the controller still
/// needs a heterogeneous list of sinks, so this trait boxes the future the
/// same way the `async-trait` crate would, without requiring the port
/// itself to pay for it.
trait DynOutputSink: Send + Sync {
    fn write<'a>(
        &'a self,
        batch: &'a EventBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), WriterRuntimeError>> + Send + 'a>>;
}

impl<T: OutputSink + Send + Sync> DynOutputSink for T {
    fn write<'a>(
        &'a self,
        batch: &'a EventBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), WriterRuntimeError>> + Send + 'a>> {
        Box::pin(OutputSink::write(self, batch))
    }
}

/// One configured sink: a name (for logging/metrics) plus the boxed port.
pub struct NamedSink {
    pub name: String,
    pub sink: Box<dyn DynOutputSink>,
}

impl NamedSink {
    #[must_use]
    pub fn new(name: impl Into<String>, sink: impl OutputSink + Send + Sync + 'static) -> Self {
        Self { name: name.into(), sink: Box::new(sink) }
    }
}

struct FreeRunningSink {
    name: String,
    tx: mpsc::Sender<EventBatch>,
    worker: JoinHandle<()>,
}

/// Fans a stream of formatted batches out to every configured sink.
pub struct OutputController {
    concurrency: Arc<Semaphore>,
    keep_order: bool,
    sinks: Vec<NamedSink>,
    free_running: Vec<FreeRunningSink>,
}

impl std::fmt::Debug for OutputController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputController")
            .field("keep_order", &self.keep_order)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl OutputController {
    /// Build a controller over `sinks`. When `config.keep_order` is false,
    /// one worker task per sink is spawned immediately, each draining its
    /// own bounded channel; `dispatch` then only waits for channel space,
    /// never for a sink's write to complete.
    #[must_use]
    pub fn new(sinks: Vec<NamedSink>, config: ControllerConfig) -> Self {
        let concurrency = Arc::new(Semaphore::new(config.max_concurrency.max(1)));

        if config.keep_order {
            return Self { concurrency, keep_order: true, sinks, free_running: Vec::new() };
        }

        let free_running = sinks
            .into_iter()
            .map(|named| spawn_worker(named, Arc::clone(&concurrency), config.queue_depth.max(1)))
            .collect();

        Self { concurrency, keep_order: false, sinks: Vec::new(), free_running }
    }

    /// Present one formatted batch to every sink.
    ///
    /// With `keep_order`, waits for every sink to finish writing `batch`
    /// before returning -- the caller must not queue batch `k+1` until this
    /// resolves. Without it, returns once the batch has been handed to
    /// every sink's queue; sinks drain independently.
    pub async fn dispatch(&self, batch: EventBatch) {
        if self.keep_order {
            // Sequential, not concurrent: each sink still only ever sees
            // batch `k+1` after every sink has finished batch `k`, so there
            // is no ordering reason to overlap the sinks here too.
            for named in &self.sinks {
                write_one(&named.name, named.sink.as_ref(), &batch, &self.concurrency).await;
            }
            return;
        }

        for worker in &self.free_running {
            if worker.tx.send(batch.clone()).await.is_err() {
                log::error!("output.dispatch.sink_gone: sink={}", worker.name);
            }
        }
    }

    /// Close every free-running sink's channel and wait for its worker to
    /// drain, matching the controller-joins-all-threads shutdown sequence
    /// (spec §5 cancellation).
    pub async fn shutdown(self) {
        for worker in self.free_running {
            drop(worker.tx);
            let _ = worker.worker.await;
        }
    }
}

fn spawn_worker(named: NamedSink, concurrency: Arc<Semaphore>, queue_depth: usize) -> FreeRunningSink {
    let (tx, mut rx) = mpsc::channel::<EventBatch>(queue_depth);
    let name = named.name.clone();
    let worker_name = name.clone();
    let worker = tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            write_one(&worker_name, named.sink.as_ref(), &batch, &concurrency).await;
        }
    });
    FreeRunningSink { name, tx, worker }
}

async fn write_one(name: &str, sink: &dyn DynOutputSink, batch: &EventBatch, concurrency: &Semaphore) {
    let _permit = concurrency.acquire().await.expect("semaphore is never closed");
    if let Err(e) = sink.write(batch).await {
        log_write_failure(name, &e);
    }
}

fn log_write_failure(name: &str, error: &WriterRuntimeError) {
    log::warn!("output.write.failed: sink={name} reason={error}");
}
