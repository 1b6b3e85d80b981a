// Rust guideline compliant 2026-07-28

//! Generator process entry point (spec §5).
//!
//! Wires a validated [`config::GeneratorConfig`] into the three-stage
//! concurrency model: a dedicated OS thread pulls, merges, batches and (in
//! `live` mode) paces timestamps; a second dedicated OS thread picks and
//! renders events against the jinja event plugin; a bridging channel feeds
//! a single async task that fans each rendered batch out to every
//! configured output sink.
//!
//! ```text
//! RUST_LOG=info eventum path/to/generator.yaml
//! ```

mod adapters;
mod config;
mod metrics;

use adapters::{FileSink, HttpSink, HttpSinkConfig, NullSink, OpensearchSink, OpensearchSinkConfig, StderrSink, StdoutSink};
use config::{
    BasicAuthSpec, FormatSpec, GeneratorConfig, HttpOutputSpec, OpensearchSpec, OutputSpec, ProducerSpec, TimeMode,
};
use domain::errors::context;
use domain::{
    EventBatch, EventContext, EventPlugin as _, ExitCode, IdentifiedTimestamp, InitError, InputPlugin, ProducerId,
    Tags, TimestampBatch,
};
use input::time_patterns::TimePatternsProducer;
use input::{
    Clock as InputClock, CronProducer, HttpProducer, LinspaceProducer, StaticProducer, SystemClock as InputSystemClock,
    TimerProducer, TimestampsProducer,
};
use metrics::{CommonMetrics, EventPluginMetrics, EventPluginStateMetrics, FormattingSink, Gauge, InputPluginMetrics, MetricsReport, OutputPluginMetrics};
use output::{ControllerConfig, Formatter, NamedSink, OutputController};
use pipeline::{BatchConfig, Batcher, Merger, Scheduler, SystemClock as SchedulerSystemClock};
use renderer::{JinjaEventPlugin, PickingConfig, SampleConfig, TemplateSpec};
use serde_json::Value;
use state::GlobalState;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timestamps pulled from the merger per stage-1 iteration. Independent of
/// `batch.size`, which governs what leaves the batcher, not what the merger
/// is asked to refill with.
const PULL_SIZE: usize = 256;

fn main() -> std::process::ExitCode {
    let _guard = logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: eventum <generator.yaml>");
        return std::process::ExitCode::from(ExitCode::Configuration.code() as u8);
    };

    match run(Path::new(&path)) {
        Ok(()) => std::process::ExitCode::from(ExitCode::Success.code() as u8),
        Err(err) => {
            log::error!("eventum.run.failed: reason={err}");
            std::process::ExitCode::from(err.exit_code().code() as u8)
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] domain::ConfigError),
    #[error(transparent)]
    Init(#[from] domain::InitError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::Configuration,
            Self::Init(_) | Self::Io(_) => ExitCode::Initialization,
        }
    }
}

fn run(config_path: &Path) -> Result<(), RunError> {
    let source = std::fs::read_to_string(config_path)?;
    let config = GeneratorConfig::from_yaml(&source)?;
    log::info!("eventum.config.loaded: id={} producers={} sinks={}", config.id, config.input.len(), config.output.len());

    let started = chrono::Utc::now().to_rfc3339();
    let clock = InputSystemClock;

    let mut producers: Vec<Box<dyn InputPlugin + Send>> = Vec::with_capacity(config.input.len());
    let mut producer_tags: Vec<Tags> = Vec::with_capacity(config.input.len());
    let mut input_metrics: Vec<InputPluginMetrics> = Vec::with_capacity(config.input.len());
    for (i, spec) in config.input.iter().enumerate() {
        let id = ProducerId::new(u16::try_from(i).unwrap_or(u16::MAX));
        let tags = Tags::from(spec.tags().to_vec());
        input_metrics.push(InputPluginMetrics {
            name: producer_kind(spec).to_owned(),
            id: id_as_u16(id),
            configuration: Value::Null,
            created: started.clone(),
        });
        producer_tags.push(tags.clone());
        producers.push(build_producer(spec, id, &clock, config.skip_past)?);
    }

    let batch_config = BatchConfig { size: config.batch.size, delay: config.batch.delay }.validate()?;
    let scheduler = (config.time_mode == TimeMode::Live).then(|| Scheduler::new(SchedulerSystemClock));

    let plugin = build_event_plugin(&config)?;
    let globals = GlobalState::named(&config.id)?;

    let mut sinks = Vec::with_capacity(config.output.len());
    let mut output_gauges: Vec<(String, Arc<Gauge>)> = Vec::with_capacity(config.output.len());
    for spec in &config.output {
        let (named, gauge) = build_sink(spec)?;
        output_gauges.push((named.name.clone(), gauge));
        sinks.push(named);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run_pipeline(
        config,
        producers,
        producer_tags,
        input_metrics,
        plugin,
        globals,
        sinks,
        output_gauges,
        batch_config,
        scheduler,
        started,
    ));
    Ok(())
}

#[expect(clippy::too_many_arguments, reason = "single call site assembling every stage of the pipeline")]
async fn run_pipeline(
    config: GeneratorConfig,
    producers: Vec<Box<dyn InputPlugin + Send>>,
    producer_tags: Vec<Tags>,
    input_metrics: Vec<InputPluginMetrics>,
    plugin: JinjaEventPlugin,
    globals: GlobalState,
    sinks: Vec<NamedSink>,
    output_gauges: Vec<(String, Arc<Gauge>)>,
    batch_config: BatchConfig,
    scheduler: Option<Scheduler<SchedulerSystemClock>>,
    started: String,
) {
    let (timestamp_tx, timestamp_rx) = std::sync::mpsc::sync_channel::<TimestampBatch>(config.queue.max_batches.max(1));
    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<EventBatch>(config.queue.max_batches.max(1));

    let merge_thread = std::thread::spawn(move || run_merge_stage(producers, batch_config, scheduler, timestamp_tx));

    let metrics_interval = Duration::from_secs_f64(config.metrics_interval.max(0.1));
    let params = config.params.clone();
    let render_thread = std::thread::spawn(move || {
        run_render_stage(
            plugin,
            globals,
            producer_tags,
            input_metrics,
            output_gauges,
            started,
            params,
            metrics_interval,
            timestamp_rx,
            event_tx,
        );
    });

    let controller = OutputController::new(
        sinks,
        ControllerConfig { keep_order: config.keep_order, max_concurrency: config.max_concurrency, queue_depth: config.queue.max_batches.max(1) },
    );

    while let Some(batch) = event_rx.recv().await {
        controller.dispatch(batch).await;
    }
    controller.shutdown().await;

    let _ = tokio::task::spawn_blocking(move || {
        let _ = merge_thread.join();
        let _ = render_thread.join();
    })
    .await;
}

fn run_merge_stage(
    producers: Vec<Box<dyn InputPlugin + Send>>,
    batch_config: BatchConfig,
    scheduler: Option<Scheduler<SchedulerSystemClock>>,
    timestamp_tx: std::sync::mpsc::SyncSender<TimestampBatch>,
) {
    let mut merger = Merger::new(producers);
    let mut batcher = Batcher::new(batch_config);

    while let Some(slice) = merger.next_slice(PULL_SIZE) {
        for batch in batcher.push(slice) {
            if send_batch(&timestamp_tx, &scheduler, batch).is_err() {
                return;
            }
        }
    }
    if let Some(batch) = batcher.flush() {
        let _ = send_batch(&timestamp_tx, &scheduler, batch);
    }
}

fn send_batch(
    tx: &std::sync::mpsc::SyncSender<TimestampBatch>,
    scheduler: &Option<Scheduler<SchedulerSystemClock>>,
    batch: TimestampBatch,
) -> Result<(), std::sync::mpsc::SendError<TimestampBatch>> {
    let batch = match scheduler {
        Some(scheduler) => scheduler.release(batch),
        None => batch,
    };
    tx.send(batch)
}

#[expect(clippy::too_many_arguments, reason = "render stage owns every resource needed for both rendering and metrics")]
fn run_render_stage(
    plugin: JinjaEventPlugin,
    globals: GlobalState,
    producer_tags: Vec<Tags>,
    input_metrics: Vec<InputPluginMetrics>,
    output_gauges: Vec<(String, Arc<Gauge>)>,
    started: String,
    params: Value,
    metrics_interval: Duration,
    timestamp_rx: std::sync::mpsc::Receiver<TimestampBatch>,
    event_tx: tokio::sync::mpsc::Sender<EventBatch>,
) {
    let event_gauge = Gauge::new();
    let mut last_emit = Instant::now();

    while let Ok(batch) = timestamp_rx.recv() {
        let events = render_batch(&plugin, &globals, &producer_tags, batch.as_slice(), &event_gauge);
        if !events.is_empty() && event_tx.blocking_send(EventBatch::new(events)).is_err() {
            break;
        }

        if last_emit.elapsed() >= metrics_interval {
            emit_metrics(&plugin, &globals, &input_metrics, &output_gauges, &event_gauge, &started, &params);
            last_emit = Instant::now();
        }
    }

    emit_metrics(&plugin, &globals, &input_metrics, &output_gauges, &event_gauge, &started, &params);
}

fn render_batch(
    plugin: &JinjaEventPlugin,
    globals: &GlobalState,
    producer_tags: &[Tags],
    items: &[IdentifiedTimestamp],
    gauge: &Gauge,
) -> Vec<String> {
    let mut events = Vec::with_capacity(items.len());
    for item in items {
        let tags = producer_tags.get(item.producer_id.index()).cloned().unwrap_or_else(|| Tags::from(vec![]));
        let ctx = EventContext { timestamp: item.timestamp, tags, locals: globals, shared: globals, globals };

        let aliases = match plugin.pick(&ctx) {
            Ok(aliases) => aliases,
            Err(e) => {
                log::warn!("eventum.pick.failed: reason={e}");
                gauge.add_produce_failed(1);
                continue;
            }
        };

        for alias in aliases {
            match plugin.render(&alias, &ctx) {
                Ok(rendered) => {
                    events.push(rendered);
                    gauge.add_produced(1);
                }
                Err(e) => {
                    log::warn!("eventum.render.failed: alias={alias} reason={e}");
                    gauge.add_produce_failed(1);
                }
            }
        }
    }
    events
}

fn emit_metrics(
    plugin: &JinjaEventPlugin,
    globals: &GlobalState,
    input_metrics: &[InputPluginMetrics],
    output_gauges: &[(String, Arc<Gauge>)],
    event_gauge: &Gauge,
    started: &str,
    params: &Value,
) {
    let event_snapshot = event_gauge.snapshot();
    let locals = plugin
        .local_states()
        .iter()
        .map(|(alias, state)| (alias.clone(), Value::Object(domain::State::as_map(state).unwrap_or_default())))
        .collect();
    let shared = domain::State::as_map(plugin.shared_state()).unwrap_or_default();
    let globals_map = domain::State::as_map(globals).unwrap_or_default();

    let output = output_gauges
        .iter()
        .enumerate()
        .map(|(i, (name, gauge))| {
            let snapshot = gauge.snapshot();
            OutputPluginMetrics {
                name: name.clone(),
                id: u16::try_from(i).unwrap_or(u16::MAX),
                configuration: Value::Null,
                written: snapshot.written,
                write_failed: snapshot.write_failed,
                format_failed: snapshot.format_failed,
            }
        })
        .collect();

    let report = MetricsReport {
        common: CommonMetrics { started: started.to_owned(), parameters: params.clone() },
        input: input_metrics.to_vec(),
        event: EventPluginMetrics {
            name: "jinja".to_owned(),
            id: 0,
            configuration: serde_json::json!({ "aliases": plugin.aliases() }),
            produced: event_snapshot.produced,
            produce_failed: event_snapshot.produce_failed,
            state: EventPluginStateMetrics { locals, shared, globals: globals_map },
        },
        output,
    };

    match serde_json::to_string(&report) {
        Ok(json) => log::info!("eventum.metrics: {json}"),
        Err(e) => log::warn!("eventum.metrics.encode_failed: reason={e}"),
    }
}

fn producer_kind(spec: &ProducerSpec) -> &'static str {
    match spec {
        ProducerSpec::Cron(_) => "cron",
        ProducerSpec::Timer(_) => "timer",
        ProducerSpec::Linspace(_) => "linspace",
        ProducerSpec::Static(_) => "static",
        ProducerSpec::Http(_) => "http",
        ProducerSpec::Timestamps(_) => "timestamps",
        ProducerSpec::TimePatterns(_) => "time_patterns",
    }
}

fn id_as_u16(id: ProducerId) -> u16 {
    u16::try_from(id.index()).unwrap_or(u16::MAX)
}

fn build_producer(
    spec: &ProducerSpec,
    id: ProducerId,
    clock: &impl InputClock,
    skip_past: bool,
) -> Result<Box<dyn InputPlugin + Send>, InitError> {
    let tags = Tags::from(spec.tags().to_vec());
    match spec {
        ProducerSpec::Cron(s) => Ok(Box::new(CronProducer::new(s.into(), id, tags, clock, skip_past)?)),
        ProducerSpec::Timer(s) => Ok(Box::new(TimerProducer::new(s.into(), id, tags, clock, skip_past))),
        ProducerSpec::Linspace(s) => Ok(Box::new(LinspaceProducer::new(s.into(), id, tags, clock, skip_past)?)),
        ProducerSpec::Static(s) => Ok(Box::new(StaticProducer::new(s.into(), id, tags, clock, skip_past))),
        ProducerSpec::Http(s) => Ok(Box::new(HttpProducer::spawn(s.into(), id, tags)?)),
        ProducerSpec::Timestamps(s) => {
            Ok(Box::new(TimestampsProducer::new(s.source.clone().into(), id, tags, clock, skip_past)?))
        }
        ProducerSpec::TimePatterns(s) => {
            let patterns = s
                .patterns
                .clone()
                .into_iter()
                .map(config::TimePatternSpec::into_pattern_spec)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| InitError { reason: e.reason, context: e.context })?;
            Ok(Box::new(TimePatternsProducer::new(id, tags, patterns, skip_past, s.seed)))
        }
    }
}

fn build_event_plugin(config: &GeneratorConfig) -> Result<JinjaEventPlugin, InitError> {
    let config::EventSpec::Jinja(jinja) = &config.event;

    let templates: Vec<TemplateSpec> = jinja.templates.iter().map(TemplateSpec::from).collect();
    let picking = PickingConfig::from(jinja.picking.clone());
    let samples: BTreeMap<String, SampleConfig> =
        jinja.samples.clone().into_iter().map(|(k, v)| (k, SampleConfig::from(v))).collect();

    JinjaEventPlugin::new(templates, picking, config.params.clone(), &samples)
}

fn build_sink(spec: &OutputSpec) -> Result<(NamedSink, Arc<Gauge>), InitError> {
    let gauge = Arc::new(Gauge::new());
    let formatter = build_formatter(spec.format())?;
    let name = spec.name().to_owned();

    let named = match spec {
        OutputSpec::Stdout(_) => NamedSink::new(name, FormattingSink::new(formatter, StdoutSink::new(), Arc::clone(&gauge))),
        OutputSpec::Stderr(_) => NamedSink::new(name, FormattingSink::new(formatter, StderrSink::new(), Arc::clone(&gauge))),
        OutputSpec::File(s) => {
            NamedSink::new(name, FormattingSink::new(formatter, FileSink::open(&s.path)?, Arc::clone(&gauge)))
        }
        OutputSpec::Http(s) => {
            let config = build_http_sink_config(s)?;
            NamedSink::new(name, FormattingSink::new(formatter, HttpSink::new(config)?, Arc::clone(&gauge)))
        }
        OutputSpec::Opensearch(s) => {
            let config = build_opensearch_sink_config(s);
            NamedSink::new(name, FormattingSink::new(formatter, OpensearchSink::new(config)?, Arc::clone(&gauge)))
        }
        OutputSpec::Null(_) => NamedSink::new(name, FormattingSink::new(formatter, NullSink::new(), Arc::clone(&gauge))),
    };
    Ok((named, gauge))
}

fn build_formatter(spec: &FormatSpec) -> Result<Formatter, InitError> {
    match spec {
        FormatSpec::Plain => Ok(Formatter::plain()),
        FormatSpec::Json { indent } => Ok(Formatter::json(*indent)),
        FormatSpec::JsonBatch { indent } => Ok(Formatter::json_batch(*indent)),
        FormatSpec::Template { source } => Formatter::template(source),
        FormatSpec::TemplateBatch { source } => Formatter::template_batch(source),
        FormatSpec::EventumHttpInput => Ok(Formatter::eventum_http_input()),
    }
}

fn build_http_sink_config(spec: &HttpOutputSpec) -> Result<HttpSinkConfig, InitError> {
    let method = spec.method.parse().map_err(|e| InitError {
        reason: format!("invalid http method `{}`: {e}", spec.method),
        context: context([]),
    })?;
    Ok(HttpSinkConfig {
        url: spec.url.clone(),
        method,
        expected_status: spec.expected_status,
        headers: spec.headers.clone(),
        basic_auth: basic_auth_tuple(spec.basic_auth.as_ref()),
        client_cert: spec.client_cert.clone(),
        client_cert_key: spec.client_cert_key.clone(),
        proxy: spec.proxy.clone(),
        connect_timeout: Duration::from_secs_f64(spec.connect_timeout_seconds),
        request_timeout: Duration::from_secs_f64(spec.request_timeout_seconds),
    })
}

fn build_opensearch_sink_config(spec: &OpensearchSpec) -> OpensearchSinkConfig {
    OpensearchSinkConfig {
        hosts: spec.hosts.clone(),
        index: spec.index.clone(),
        basic_auth: basic_auth_tuple(spec.basic_auth.as_ref()),
        request_timeout: Duration::from_secs_f64(spec.request_timeout_seconds),
    }
}

fn basic_auth_tuple(auth: Option<&BasicAuthSpec>) -> Option<(String, String)> {
    auth.map(|a| (a.username.clone(), a.password.clone()))
}
