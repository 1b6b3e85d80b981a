// Rust guideline compliant 2026-02-23

//! Generator configuration (spec §6): the already-validated YAML document
//! shape. Token substitution of `${params.NAME}`/`${secrets.NAME}` happens
//! before this module ever sees the text (out of scope, spec §1); these
//! types only model the validated tree and convert it into the concrete
//! plugin configs each library crate expects.
//!
//! Every `input`/`event`/`output` entry is a single-key map, key = kind --
//! serde's default externally-tagged enum representation is exactly that
//! shape, so no custom `Deserialize` impl is needed for the dispatch itself.

use chrono::{DateTime, Utc};
use domain::errors::context;
use domain::ConfigError;
use input::time_patterns::{Multiplier, OscillatorConfig, RandomizerConfig, RandomizerDirection, Spreader, TimeUnit};
use input::{
    CronConfig, HttpConfig as HttpProducerConfig, LinspaceConfig, PatternSpec, StaticConfig, TimerConfig,
    TimestampsSource,
};
use renderer::fsm::Condition;
use renderer::{FsmState, FsmTransition, PickingConfig, SampleConfig, TemplateSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root generator configuration document (spec §6 generator parameters).
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub id: String,
    #[serde(default)]
    pub path: PathBuf,
    pub time_mode: TimeMode,
    pub timezone: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub batch: BatchSpec,
    pub queue: QueueSpec,
    #[serde(default)]
    pub keep_order: bool,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub skip_past: bool,
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval: f64,
    pub input: Vec<ProducerSpec>,
    pub event: EventSpec,
    pub output: Vec<OutputSpec>,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_metrics_interval() -> f64 {
    60.0
}

fn default_true() -> bool {
    true
}

impl GeneratorConfig {
    /// Parse and structurally validate a generator config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document fails to parse against the
    /// expected shape, or `input`/`output`/`queue.max_batches` fail the
    /// non-empty/non-zero checks spec §6 requires.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)
            .map_err(|e| ConfigError { reason: format!("invalid generator configuration: {e}"), context: context([]) })?;

        if config.input.is_empty() {
            return Err(ConfigError {
                reason: "generator config needs at least one input producer".to_owned(),
                context: context([("id", &config.id)]),
            });
        }
        if config.output.is_empty() {
            return Err(ConfigError {
                reason: "generator config needs at least one output sink".to_owned(),
                context: context([("id", &config.id)]),
            });
        }
        if config.queue.max_batches == 0 {
            return Err(ConfigError {
                reason: "queue.max_batches must be >= 1".to_owned(),
                context: context([("id", &config.id)]),
            });
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    Live,
    Sample,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BatchSpec {
    pub size: Option<usize>,
    pub delay: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QueueSpec {
    pub max_batches: usize,
}

// ---------------------------------------------------------------------------
// input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerSpec {
    Cron(CronSpec),
    Timer(TimerSpec),
    Linspace(LinspaceSpec),
    Static(StaticSpec),
    Http(HttpProducerSpec),
    Timestamps(TimestampsSpec),
    TimePatterns(TimePatternsSpec),
}

impl ProducerSpec {
    #[must_use]
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Cron(s) => &s.tags,
            Self::Timer(s) => &s.tags,
            Self::Linspace(s) => &s.tags,
            Self::Static(s) => &s.tags,
            Self::Http(s) => &s.tags,
            Self::Timestamps(s) => &s.tags,
            Self::TimePatterns(s) => &s.tags,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CronSpec {
    pub expression: String,
    pub count: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&CronSpec> for CronConfig {
    fn from(spec: &CronSpec) -> Self {
        Self { expression: spec.expression.clone(), count: spec.count, start: spec.start, end: spec.end }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimerSpec {
    pub start: DateTime<Utc>,
    pub seconds: f64,
    pub count: usize,
    #[serde(default)]
    pub repeat: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&TimerSpec> for TimerConfig {
    fn from(spec: &TimerSpec) -> Self {
        Self { start: spec.start, seconds: spec.seconds, count: spec.count, repeat: spec.repeat }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinspaceSpec {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: usize,
    #[serde(default = "default_true")]
    pub endpoint: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&LinspaceSpec> for LinspaceConfig {
    fn from(spec: &LinspaceSpec) -> Self {
        Self { start: spec.start, end: spec.end, count: spec.count, endpoint: spec.endpoint }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticSpec {
    pub start: DateTime<Utc>,
    pub count: usize,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&StaticSpec> for StaticConfig {
    fn from(spec: &StaticSpec) -> Self {
        Self { start: spec.start, count: spec.count }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpProducerSpec {
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&HttpProducerSpec> for HttpProducerConfig {
    fn from(spec: &HttpProducerSpec) -> Self {
        Self { bind_addr: spec.bind_addr }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampsSourceSpec {
    List(Vec<DateTime<Utc>>),
    File(PathBuf),
}

impl From<TimestampsSourceSpec> for TimestampsSource {
    fn from(spec: TimestampsSourceSpec) -> Self {
        match spec {
            TimestampsSourceSpec::List(items) => Self::List(items),
            TimestampsSourceSpec::File(path) => Self::File(path),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimestampsSpec {
    pub source: TimestampsSourceSpec,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One sub-pattern of a `time_patterns` producer, embedded directly in the
/// generator config rather than read from a separate pattern file -- a
/// self-contained representation of the same oscillator/multiplier/
/// randomizer/spreader quadruple the original loads per-file.
#[derive(Debug, Clone, Deserialize)]
pub struct TimePatternSpec {
    pub oscillator: OscillatorSpec,
    pub multiplier: MultiplierSpec,
    #[serde(default)]
    pub randomizer: RandomizerSpec,
    pub spreader: SpreaderSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OscillatorSpec {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period: i64,
    pub unit: TimeUnitSpec,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnitSpec {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl From<TimeUnitSpec> for TimeUnit {
    fn from(spec: TimeUnitSpec) -> Self {
        match spec {
            TimeUnitSpec::Seconds => Self::Seconds,
            TimeUnitSpec::Minutes => Self::Minutes,
            TimeUnitSpec::Hours => Self::Hours,
            TimeUnitSpec::Days => Self::Days,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MultiplierSpec {
    pub ratio: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomizerDirectionSpec {
    Decrease,
    Increase,
    Mixed,
}

impl From<RandomizerDirectionSpec> for RandomizerDirection {
    fn from(spec: RandomizerDirectionSpec) -> Self {
        match spec {
            RandomizerDirectionSpec::Decrease => Self::Decrease,
            RandomizerDirectionSpec::Increase => Self::Increase,
            RandomizerDirectionSpec::Mixed => Self::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RandomizerSpec {
    #[serde(default = "default_randomizer_direction")]
    pub direction: RandomizerDirectionSpec,
    #[serde(default)]
    pub deviation: f64,
    #[serde(default = "default_randomizer_sampling")]
    pub sampling: usize,
}

fn default_randomizer_direction() -> RandomizerDirectionSpec {
    RandomizerDirectionSpec::Mixed
}

fn default_randomizer_sampling() -> usize {
    1024
}

impl Default for RandomizerSpec {
    fn default() -> Self {
        Self { direction: default_randomizer_direction(), deviation: 0.0, sampling: default_randomizer_sampling() }
    }
}

impl From<RandomizerSpec> for RandomizerConfig {
    fn from(spec: RandomizerSpec) -> Self {
        Self { direction: spec.direction.into(), deviation: spec.deviation, sampling: spec.sampling }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreaderSpec {
    Uniform { low: f64, high: f64 },
    Triangular { left: f64, mode: f64, right: f64 },
    Beta { a: f64, b: f64 },
}

impl From<SpreaderSpec> for Spreader {
    fn from(spec: SpreaderSpec) -> Self {
        match spec {
            SpreaderSpec::Uniform { low, high } => Self::Uniform { low, high },
            SpreaderSpec::Triangular { left, mode, right } => Self::Triangular { left, mode, right },
            SpreaderSpec::Beta { a, b } => Self::Beta { a, b },
        }
    }
}

impl TimePatternSpec {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the declared `spreader` shape is
    /// degenerate (see [`Spreader::validate`]).
    pub fn into_pattern_spec(self) -> Result<PatternSpec, ConfigError> {
        let spreader: Spreader =
            self.spreader.into().validate().map_err(|e| ConfigError { reason: e.reason, context: e.context })?;
        Ok(PatternSpec {
            oscillator: OscillatorConfig {
                start: self.oscillator.start,
                end: self.oscillator.end,
                period: self.oscillator.period,
                unit: self.oscillator.unit.into(),
            },
            multiplier: Multiplier { ratio: self.multiplier.ratio },
            randomizer: self.randomizer.into(),
            spreader,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimePatternsSpec {
    pub patterns: Vec<TimePatternSpec>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSpec {
    Jinja(JinjaEventSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JinjaEventSpec {
    pub templates: Vec<TemplateEntrySpec>,
    pub picking: PickingSpec,
    #[serde(default)]
    pub samples: BTreeMap<String, SampleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntrySpec {
    pub alias: String,
    pub source: String,
}

impl From<&TemplateEntrySpec> for TemplateSpec {
    fn from(spec: &TemplateEntrySpec) -> Self {
        Self { alias: spec.alias.clone(), source: spec.source.clone() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSpec {
    Items(Vec<serde_json::Value>),
    Csv {
        source: PathBuf,
        #[serde(default = "default_true")]
        header: bool,
        #[serde(default = "default_delimiter")]
        delimiter: u8,
    },
    Json {
        source: PathBuf,
    },
}

fn default_delimiter() -> u8 {
    b','
}

impl From<SampleSpec> for SampleConfig {
    fn from(spec: SampleSpec) -> Self {
        match spec {
            SampleSpec::Items(items) => Self::Items(items),
            SampleSpec::Csv { source, header, delimiter } => Self::Csv { source, header, delimiter },
            SampleSpec::Json { source } => Self::Json { source },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PickingSpec {
    All,
    Any { seed: Option<u64> },
    Chance { weights: Vec<f64>, seed: Option<u64> },
    Spin,
    Fsm { states: Vec<FsmStateSpec> },
    Chain { chain: Vec<String> },
}

impl From<PickingSpec> for PickingConfig {
    fn from(spec: PickingSpec) -> Self {
        match spec {
            PickingSpec::All => Self::All,
            PickingSpec::Any { seed } => Self::Any { seed },
            PickingSpec::Chance { weights, seed } => Self::Chance { weights, seed },
            PickingSpec::Spin => Self::Spin,
            PickingSpec::Fsm { states } => {
                Self::Fsm { states: states.into_iter().map(FsmStateSpec::into_fsm_state).collect() }
            }
            PickingSpec::Chain { chain } => Self::Chain { chain },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FsmStateSpec {
    pub alias: String,
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub transition: Option<FsmTransitionSpec>,
}

impl FsmStateSpec {
    fn into_fsm_state(self) -> FsmState {
        FsmState { alias: self.alias, initial: self.initial, transition: self.transition.map(FsmTransitionSpec::into_transition) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FsmTransitionSpec {
    pub to: String,
    pub when: ConditionSpec,
}

impl FsmTransitionSpec {
    fn into_transition(self) -> FsmTransition {
        FsmTransition { to: self.to, when: self.when.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConditionSpec {
    Eq { path: String, value: serde_json::Value },
    LenEq { path: String, value: usize },
    LenGt { path: String, value: usize },
    LenGe { path: String, value: usize },
    LenLt { path: String, value: usize },
    LenLe { path: String, value: usize },
}

impl From<ConditionSpec> for Condition {
    fn from(spec: ConditionSpec) -> Self {
        match spec {
            ConditionSpec::Eq { path, value } => Self::Eq { path, value },
            ConditionSpec::LenEq { path, value } => Self::LenEq { path, value },
            ConditionSpec::LenGt { path, value } => Self::LenGt { path, value },
            ConditionSpec::LenGe { path, value } => Self::LenGe { path, value },
            ConditionSpec::LenLt { path, value } => Self::LenLt { path, value },
            ConditionSpec::LenLe { path, value } => Self::LenLe { path, value },
        }
    }
}

// ---------------------------------------------------------------------------
// output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSpec {
    Stdout(StdoutSpec),
    Stderr(StderrSpec),
    File(FileSpec),
    Http(HttpOutputSpec),
    Opensearch(OpensearchSpec),
    Null(NullSpec),
}

impl OutputSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Stdout(_) => "stdout",
            Self::Stderr(_) => "stderr",
            Self::File(s) => s.path.to_str().unwrap_or("file"),
            Self::Http(s) => s.url.as_str(),
            Self::Opensearch(_) => "opensearch",
            Self::Null(_) => "null",
        }
    }

    #[must_use]
    pub fn format(&self) -> &FormatSpec {
        match self {
            Self::Stdout(s) => &s.format,
            Self::Stderr(s) => &s.format,
            Self::File(s) => &s.format,
            Self::Http(s) => &s.format,
            Self::Opensearch(s) => &s.format,
            Self::Null(s) => &s.format,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StdoutSpec {
    #[serde(default)]
    pub format: FormatSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StderrSpec {
    #[serde(default)]
    pub format: FormatSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub format: FormatSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpOutputSpec {
    pub url: String,
    #[serde(default = "default_http_method")]
    pub method: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub basic_auth: Option<BasicAuthSpec>,
    #[serde(default)]
    pub client_cert: Option<PathBuf>,
    #[serde(default)]
    pub client_cert_key: Option<PathBuf>,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub connect_timeout_seconds: f64,
    #[serde(default = "default_timeout_seconds")]
    pub request_timeout_seconds: f64,
    #[serde(default)]
    pub format: FormatSpec,
}

fn default_http_method() -> String {
    "POST".to_owned()
}

fn default_expected_status() -> u16 {
    200
}

fn default_timeout_seconds() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuthSpec {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpensearchSpec {
    pub hosts: Vec<String>,
    pub index: String,
    #[serde(default)]
    pub basic_auth: Option<BasicAuthSpec>,
    #[serde(default = "default_timeout_seconds")]
    pub request_timeout_seconds: f64,
    #[serde(default)]
    pub format: FormatSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NullSpec {
    #[serde(default)]
    pub format: FormatSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FormatSpec {
    #[default]
    Plain,
    Json {
        #[serde(default = "default_indent")]
        indent: usize,
    },
    JsonBatch {
        #[serde(default = "default_indent")]
        indent: usize,
    },
    Template {
        source: String,
    },
    TemplateBatch {
        source: String,
    },
    EventumHttpInput,
}

fn default_indent() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::GeneratorConfig;

    const MINIMAL: &str = r#"
id: demo
time_mode: sample
timezone: UTC
batch:
  size: 10
queue:
  max_batches: 4
input:
  - static:
      start: "2024-01-01T00:00:00Z"
      count: 3
event:
  jinja:
    templates:
      - alias: only
        source: "{{ timestamp }}"
    picking:
      mode: all
output:
  - stdout: {}
"#;

    #[test]
    fn parses_a_minimal_generator_config() {
        let config = GeneratorConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.id, "demo");
        assert_eq!(config.input.len(), 1);
        assert_eq!(config.output.len(), 1);
    }

    #[test]
    fn rejects_config_with_no_input() {
        let yaml = MINIMAL.replace("input:\n  - static:\n      start: \"2024-01-01T00:00:00Z\"\n      count: 3\n", "input: []\n");
        assert!(GeneratorConfig::from_yaml(&yaml).is_err());
    }
}
