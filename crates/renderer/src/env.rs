// Rust guideline compliant 2026-02-23

//! Template environment: wires `params`, `samples`, the module provider, and
//! the subprocess runner into a `minijinja::Environment`, and renders one
//! template against an [`domain::EventContext`] (spec §4.5 rendering
//! contract).
//!
//! State scopes are exposed to templates as plain read-only snapshots
//! (`locals`, `shared`, `globals`) plus a matching `<scope>_set(key, value)`
//! function per scope. minijinja stores registered functions behind an
//! `Arc`, so each scope's pending writes are buffered in an
//! `Arc<Mutex<Vec<_>>>` rather than the `Rc<RefCell<_>>` the rest of this
//! workspace otherwise favors for single-writer state -- the buffer only
//! lives for the duration of one `render` call, and the mutex is never
//! contended outside it.

use crate::module_provider;
use crate::samples::Samples;
use crate::subprocess::SubprocessRunner;
use domain::errors::context;
use domain::{EventContext, InitError, RendererRuntimeError};
use minijinja::value::Value;
use minijinja::{context, Environment, Error, ErrorKind};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A configured minijinja environment plus every declared template source.
pub struct TemplateEnv {
    env: Environment<'static>,
}

impl std::fmt::Debug for TemplateEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEnv").finish_non_exhaustive()
    }
}

impl TemplateEnv {
    /// Build an environment with `params` and `samples` bound as globals,
    /// and the bundled module-provider and subprocess-runner functions
    /// registered.
    #[must_use]
    pub fn new(params: &serde_json::Value, samples: &Samples) -> Self {
        let mut env = Environment::new();
        module_provider::install(&mut env);
        env.add_function("subprocess_run", subprocess_run);
        env.add_global("params", Value::from_serialize(params));
        env.add_global("samples", Value::from_serialize(samples.as_value_map()));
        Self { env }
    }

    /// Load one named template's source.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if `source` fails to parse.
    pub fn add_template(&mut self, alias: String, source: String) -> Result<(), InitError> {
        self.env.add_template_owned(alias, source).map_err(|e| InitError {
            reason: format!("failed to parse template: {e}"),
            context: context([]),
        })
    }

    /// Render the template named `alias` against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`RendererRuntimeError`] with `alias` in its context map if
    /// the template is undeclared, a state scope fails to snapshot, or
    /// rendering itself fails (spec §4.5 rendering failure).
    pub fn render(&self, alias: &str, ctx: &EventContext<'_>) -> Result<String, RendererRuntimeError> {
        let fail = |reason: String| RendererRuntimeError { reason, context: context([("alias", alias)]) };

        let template = self.env.get_template(alias).map_err(|e| fail(format!("template not declared: {e}")))?;

        let locals_snapshot = ctx.locals.as_map().map_err(|e| fail(e.to_string()))?;
        let shared_snapshot = ctx.shared.as_map().map_err(|e| fail(e.to_string()))?;
        let globals_snapshot = ctx.globals.as_map().map_err(|e| fail(e.to_string()))?;

        let locals_writes = Arc::new(Mutex::new(Vec::new()));
        let shared_writes = Arc::new(Mutex::new(Vec::new()));
        let globals_writes = Arc::new(Mutex::new(Vec::new()));

        let render_ctx = context! {
            timestamp => ctx.timestamp.to_naive().and_utc().to_rfc3339(),
            tags => ctx.tags.iter().cloned().collect::<Vec<_>>(),
            locals => Value::from_serialize(&locals_snapshot),
            shared => Value::from_serialize(&shared_snapshot),
            globals => Value::from_serialize(&globals_snapshot),
            locals_set => scope_setter(Arc::clone(&locals_writes)),
            shared_set => scope_setter(Arc::clone(&shared_writes)),
            globals_set => scope_setter(Arc::clone(&globals_writes)),
        };

        let rendered = template.render(render_ctx).map_err(|e| fail(format!("render failed: {e}")))?;

        drain_into(&locals_writes, ctx.locals).map_err(|e| fail(e.to_string()))?;
        drain_into(&shared_writes, ctx.shared).map_err(|e| fail(e.to_string()))?;
        drain_into(&globals_writes, ctx.globals).map_err(|e| fail(e.to_string()))?;

        Ok(rendered)
    }
}

type WriteBuf = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

fn scope_setter(buf: WriteBuf) -> Value {
    Value::from_function(move |key: String, value: Value| -> Result<(), Error> {
        let json = serde_json::to_value(value)
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("cannot store non-serializable value: {e}")))?;
        buf.lock().expect("write buffer mutex poisoned").push((key, json));
        Ok(())
    })
}

fn drain_into(buf: &WriteBuf, scope: &dyn domain::State) -> Result<(), domain::StateError> {
    let entries = std::mem::take(&mut *buf.lock().expect("write buffer mutex poisoned"));
    if entries.is_empty() {
        return Ok(());
    }
    scope.update(&entries)
}

fn subprocess_run(
    command: String,
    cwd: Option<String>,
    env: Option<BTreeMap<String, String>>,
    timeout_seconds: Option<f64>,
) -> Result<Value, Error> {
    let runner = SubprocessRunner::new();
    let timeout = timeout_seconds.map(Duration::from_secs_f64);
    let result = runner
        .run(&command, cwd.as_deref(), env.as_ref(), timeout)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
    Ok(context! { stdout => result.stdout, stderr => result.stderr, exit_code => result.exit_code })
}

#[cfg(test)]
mod tests {
    use super::TemplateEnv;
    use crate::samples::Samples;
    use domain::{EventContext, State, Tags, Timestamp};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct MapState(RefCell<BTreeMap<String, serde_json::Value>>);

    impl MapState {
        fn new() -> Self {
            Self(RefCell::new(BTreeMap::new()))
        }
    }

    impl State for MapState {
        fn get(&self, key: &str) -> Result<Option<serde_json::Value>, domain::StateError> {
            Ok(self.0.borrow().get(key).cloned())
        }
        fn set(&self, key: &str, value: serde_json::Value) -> Result<(), domain::StateError> {
            self.0.borrow_mut().insert(key.to_owned(), value);
            Ok(())
        }
        fn update(&self, entries: &[(String, serde_json::Value)]) -> Result<(), domain::StateError> {
            for (k, v) in entries {
                self.0.borrow_mut().insert(k.clone(), v.clone());
            }
            Ok(())
        }
        fn clear(&self) -> Result<(), domain::StateError> {
            self.0.borrow_mut().clear();
            Ok(())
        }
        fn as_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, domain::StateError> {
            Ok(self.0.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        }
    }

    fn ctx<'a>(locals: &'a MapState, shared: &'a MapState, globals: &'a MapState) -> EventContext<'a> {
        EventContext {
            timestamp: Timestamp::from_naive(chrono::Utc::now().naive_utc()),
            tags: Tags::from(vec!["t".to_owned()]),
            locals,
            shared,
            globals,
        }
    }

    #[test]
    fn renders_params_and_tags() {
        let mut env = TemplateEnv::new(&json!({"service": "api"}), &Samples::default());
        env.add_template("t".to_owned(), "{{ params.service }}/{{ tags[0] }}".to_owned()).unwrap();
        let (l, s, g) = (MapState::new(), MapState::new(), MapState::new());
        let rendered = env.render("t", &ctx(&l, &s, &g)).unwrap();
        assert_eq!(rendered, "api/t");
    }

    #[test]
    fn locals_set_persists_back_into_the_scope() {
        let mut env = TemplateEnv::new(&json!({}), &Samples::default());
        env.add_template("t".to_owned(), "{{ locals_set('count', 1) }}ok".to_owned()).unwrap();
        let (l, s, g) = (MapState::new(), MapState::new(), MapState::new());
        env.render("t", &ctx(&l, &s, &g)).unwrap();
        assert_eq!(l.get("count").unwrap(), Some(json!(1)));
    }

    #[test]
    fn reads_a_locals_snapshot() {
        let mut env = TemplateEnv::new(&json!({}), &Samples::default());
        env.add_template("t".to_owned(), "{{ locals.count }}".to_owned()).unwrap();
        let (l, s, g) = (MapState::new(), MapState::new(), MapState::new());
        l.set("count", json!(7)).unwrap();
        assert_eq!(env.render("t", &ctx(&l, &s, &g)).unwrap(), "7");
    }

    #[test]
    fn undeclared_template_is_a_renderer_runtime_error() {
        let env = TemplateEnv::new(&json!({}), &Samples::default());
        let (l, s, g) = (MapState::new(), MapState::new(), MapState::new());
        assert!(env.render("missing", &ctx(&l, &s, &g)).is_err());
    }
}
