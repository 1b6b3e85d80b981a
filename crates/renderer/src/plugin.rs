// Rust guideline compliant 2026-02-23

//! The jinja-flavored event plugin (spec §4.5): wires a [`Picker`], a
//! [`TemplateEnv`], and the `locals`/`shared` state scopes into
//! `domain::EventPlugin`.
//!
//! `locals` is one scope per declared template alias (mirroring the
//! original's per-template `SingleThreadState`), while `shared` is a single
//! scope for the whole plugin. `globals` is never owned here: the caller
//! supplies it on every [`EventContext`] (one cross-process handle per
//! generator, constructed once by the binary).

use crate::env::TemplateEnv;
use crate::picker::{FsmState, Picker};
use crate::samples::{SampleConfig, Samples};
use domain::errors::context;
use domain::{EventContext, EventPlugin, InitError, RendererRuntimeError, State};
use state::MemoryState;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// One declared template: its alias and jinja source.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub alias: String,
    pub source: String,
}

/// Picker construction parameters, one variant per mode in the spec §4.5
/// table. `aliases` for every mode except `fsm` come from the declared
/// template order; `fsm` carries its own per-state aliases.
#[derive(Debug, Clone)]
pub enum PickingConfig {
    All,
    Any { seed: Option<u64> },
    Chance { weights: Vec<f64>, seed: Option<u64> },
    Spin,
    Fsm { states: Vec<FsmState> },
    Chain { chain: Vec<String> },
}

/// The jinja event plugin.
#[derive(Debug)]
pub struct JinjaEventPlugin {
    picker: Picker,
    env: TemplateEnv,
    locals: BTreeMap<String, MemoryState>,
    shared: MemoryState,
    aliases: Vec<String>,
    last_alias: RefCell<String>,
}

impl JinjaEventPlugin {
    /// # Errors
    ///
    /// Returns [`InitError`] if no templates are declared, a template fails
    /// to parse, a sample fails to load, or the picker configuration is
    /// invalid (bad `fsm`/`chain`/`chance` declaration).
    pub fn new(
        templates: Vec<TemplateSpec>,
        picking: PickingConfig,
        params: serde_json::Value,
        sample_configs: &BTreeMap<String, SampleConfig>,
    ) -> Result<Self, InitError> {
        let aliases: Vec<String> = templates.iter().map(|t| t.alias.clone()).collect();
        let first_alias = aliases.first().cloned().ok_or_else(|| InitError {
            reason: "jinja event plugin needs at least one declared template".to_owned(),
            context: context([]),
        })?;

        let picker = build_picker(aliases.clone(), picking)
            .map_err(|e| InitError { reason: e.reason, context: e.context })?;

        let samples = Samples::load(sample_configs)?;
        let mut env = TemplateEnv::new(&params, &samples);
        for template in &templates {
            env.add_template(template.alias.clone(), template.source.clone())?;
        }

        let locals = aliases.iter().map(|alias| (alias.clone(), MemoryState::new())).collect();

        Ok(Self { picker, env, locals, shared: MemoryState::new(), aliases, last_alias: RefCell::new(first_alias) })
    }

    /// Every declared template alias, in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// This plugin's shared state scope, for metrics reporting.
    #[must_use]
    pub fn shared_state(&self) -> &dyn State {
        &self.shared
    }

    /// This plugin's per-alias local state scopes, for metrics reporting.
    #[must_use]
    pub fn local_states(&self) -> &BTreeMap<String, MemoryState> {
        &self.locals
    }

    fn locals_for(&self, alias: &str) -> Option<&dyn State> {
        self.locals.get(alias).map(|state| state as &dyn State)
    }

    fn inner_context<'a>(&'a self, alias: &str, outer: &EventContext<'a>) -> Result<EventContext<'a>, RendererRuntimeError> {
        let locals = self.locals_for(alias).ok_or_else(|| RendererRuntimeError {
            reason: format!("no such template alias `{alias}`"),
            context: context([("alias", alias)]),
        })?;
        Ok(EventContext { timestamp: outer.timestamp, tags: outer.tags.clone(), locals, shared: &self.shared, globals: outer.globals })
    }
}

impl EventPlugin for JinjaEventPlugin {
    fn pick(&self, ctx: &EventContext<'_>) -> Result<Vec<String>, RendererRuntimeError> {
        let current = self.last_alias.borrow().clone();
        let inner = self.inner_context(&current, ctx)?;
        self.picker.pick(&inner)
    }

    fn render(&self, alias: &str, ctx: &EventContext<'_>) -> Result<String, RendererRuntimeError> {
        let inner = self.inner_context(alias, ctx)?;
        let rendered = self.env.render(alias, &inner)?;
        *self.last_alias.borrow_mut() = alias.to_owned();
        Ok(rendered)
    }
}

fn build_picker(aliases: Vec<String>, picking: PickingConfig) -> Result<Picker, domain::ConfigError> {
    match picking {
        PickingConfig::All => Ok(Picker::all(aliases)),
        PickingConfig::Any { seed } => Ok(Picker::any(aliases, seed)),
        PickingConfig::Chance { weights, seed } => Picker::chance(aliases, weights, seed),
        PickingConfig::Spin => Ok(Picker::spin(aliases)),
        PickingConfig::Fsm { states } => Picker::fsm(states),
        PickingConfig::Chain { chain } => Picker::chain(aliases, chain),
    }
}
