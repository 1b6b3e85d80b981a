// Rust guideline compliant 2026-02-23

//! Transition condition grammar for the `fsm` picker (spec §4.5).
//!
//! A condition names a dotted `<scope>.<key>` path into one of the three
//! state scopes and compares the value found there.

use domain::errors::context;
use domain::{EventContext, RendererRuntimeError, State};
use serde_json::Value;

/// A transition condition, evaluated against the current event context.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `<path> == value`
    Eq { path: String, value: Value },
    /// `len(<path>) == value`
    LenEq { path: String, value: usize },
    /// `len(<path>) > value`
    LenGt { path: String, value: usize },
    /// `len(<path>) >= value`
    LenGe { path: String, value: usize },
    /// `len(<path>) < value`
    LenLt { path: String, value: usize },
    /// `len(<path>) <= value`
    LenLe { path: String, value: usize },
}

impl Condition {
    /// # Errors
    ///
    /// Returns [`RendererRuntimeError`] if the path is malformed, names an
    /// unknown scope, or the backing state store fails to answer `get`.
    pub fn evaluate(&self, ctx: &EventContext<'_>) -> Result<bool, RendererRuntimeError> {
        Ok(match self {
            Self::Eq { path, value } => resolve(ctx, path)?.as_ref() == Some(value),
            Self::LenEq { path, value } => len_of(&resolve(ctx, path)?) == Some(*value),
            Self::LenGt { path, value } => len_of(&resolve(ctx, path)?).is_some_and(|len| len > *value),
            Self::LenGe { path, value } => len_of(&resolve(ctx, path)?).is_some_and(|len| len >= *value),
            Self::LenLt { path, value } => len_of(&resolve(ctx, path)?).is_some_and(|len| len < *value),
            Self::LenLe { path, value } => len_of(&resolve(ctx, path)?).is_some_and(|len| len <= *value),
        })
    }
}

fn resolve(ctx: &EventContext<'_>, path: &str) -> Result<Option<Value>, RendererRuntimeError> {
    let (scope, key) = path.split_once('.').ok_or_else(|| RendererRuntimeError {
        reason: format!("malformed state path `{path}`, expected `<scope>.<key>`"),
        context: context([("path", path)]),
    })?;
    let state: &dyn State = match scope {
        "locals" => ctx.locals,
        "shared" => ctx.shared,
        "globals" => ctx.globals,
        other => {
            return Err(RendererRuntimeError {
                reason: format!("unknown state scope `{other}`"),
                context: context([("path", path)]),
            });
        }
    };
    state.get(key).map_err(|e| RendererRuntimeError { reason: e.to_string(), context: context([("path", path)]) })
}

fn len_of(value: &Option<Value>) -> Option<usize> {
    match value {
        Some(Value::String(s)) => Some(s.chars().count()),
        Some(Value::Array(a)) => Some(a.len()),
        Some(Value::Object(o)) => Some(o.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Condition;
    use domain::{EventContext, State, StateError, Tags, Timestamp};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct MapState(RefCell<BTreeMap<String, Value>>);

    impl State for MapState {
        fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
            Ok(self.0.borrow().get(key).cloned())
        }
        fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
            self.0.borrow_mut().insert(key.to_owned(), value);
            Ok(())
        }
        fn update(&self, entries: &[(String, Value)]) -> Result<(), StateError> {
            for (k, v) in entries {
                self.0.borrow_mut().insert(k.clone(), v.clone());
            }
            Ok(())
        }
        fn clear(&self) -> Result<(), StateError> {
            self.0.borrow_mut().clear();
            Ok(())
        }
        fn as_map(&self) -> Result<serde_json::Map<String, Value>, StateError> {
            Ok(self.0.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        }
    }

    fn context<'a>(shared: &'a MapState, locals: &'a MapState, globals: &'a MapState) -> EventContext<'a> {
        EventContext {
            timestamp: Timestamp::from_naive(chrono::Utc::now().naive_utc()),
            tags: Tags::from(vec![]),
            locals,
            shared,
            globals,
        }
    }

    #[test]
    fn eq_condition_compares_the_resolved_value() {
        let shared = MapState(RefCell::new(BTreeMap::new()));
        let (locals, globals) = (MapState(RefCell::new(BTreeMap::new())), MapState(RefCell::new(BTreeMap::new())));
        shared.set("flag", json!(true)).unwrap();
        let ctx = context(&shared, &locals, &globals);
        let condition = Condition::Eq { path: "shared.flag".to_owned(), value: json!(true) };
        assert!(condition.evaluate(&ctx).unwrap());
    }

    #[test]
    fn len_gt_condition_checks_array_length() {
        let shared = MapState(RefCell::new(BTreeMap::new()));
        let (locals, globals) = (MapState(RefCell::new(BTreeMap::new())), MapState(RefCell::new(BTreeMap::new())));
        shared.set("items", json!([1, 2, 3])).unwrap();
        let ctx = context(&shared, &locals, &globals);
        assert!(Condition::LenGt { path: "shared.items".to_owned(), value: 2 }.evaluate(&ctx).unwrap());
        assert!(!Condition::LenGt { path: "shared.items".to_owned(), value: 3 }.evaluate(&ctx).unwrap());
    }

    #[test]
    fn malformed_path_is_a_renderer_runtime_error() {
        let shared = MapState(RefCell::new(BTreeMap::new()));
        let (locals, globals) = (MapState(RefCell::new(BTreeMap::new())), MapState(RefCell::new(BTreeMap::new())));
        let ctx = context(&shared, &locals, &globals);
        let condition = Condition::Eq { path: "no_dot_here".to_owned(), value: json!(1) };
        assert!(condition.evaluate(&ctx).is_err());
    }
}
