// Rust guideline compliant 2026-02-16

//! In-process state scopes (spec §3): `locals` is private per event,
//! `shared` is shared across events within one producer. Both are
//! single-writer, so every operation is infallible in practice.

use domain::{State, StateError};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// An in-process key/value scope backed by a `BTreeMap`.
///
/// Used for both the `locals` and `shared` template scopes; the two differ
/// only in how long-lived the handle given to the renderer is, not in
/// implementation.
#[derive(Debug, Default)]
pub struct MemoryState {
    inner: RefCell<BTreeMap<String, Value>>,
}

impl MemoryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl State for MemoryState {
    fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        self.inner.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }

    fn update(&self, entries: &[(String, Value)]) -> Result<(), StateError> {
        let mut inner = self.inner.borrow_mut();
        for (key, value) in entries {
            inner.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        self.inner.borrow_mut().clear();
        Ok(())
    }

    fn as_map(&self) -> Result<serde_json::Map<String, Value>, StateError> {
        Ok(self.inner.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryState;
    use domain::State;
    use serde_json::json;

    #[test]
    fn round_trips_a_value() {
        let state = MemoryState::new();
        state.set("hits", json!(1)).unwrap();
        assert_eq!(state.get("hits").unwrap(), Some(json!(1)));
    }

    #[test]
    fn as_map_reflects_every_set_key() {
        let state = MemoryState::new();
        state.set("a", json!(1)).unwrap();
        state.set("b", json!(2)).unwrap();
        let map = state.as_map().unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn clear_empties_the_scope() {
        let state = MemoryState::new();
        state.set("a", json!(1)).unwrap();
        state.clear().unwrap();
        assert_eq!(state.get("a").unwrap(), None);
    }
}
