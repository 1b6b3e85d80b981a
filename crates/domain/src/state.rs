// Rust guideline compliant 2026-02-16

//! The `State` port: the key/value scope templates read and write.
//!
//! One trait covers all three scopes (local, shared, global -- spec §3):
//! local and shared are in-process maps with an infallible implementation,
//! while global state additionally crosses a file lock and a shared-memory
//! region, so every operation here returns a `Result`.

use crate::errors::{context, Context};
use serde_json::Value;

/// Failure reading, writing, or locking a state scope.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateError {
    /// The shared-memory region could not be locked, mapped, or resized.
    #[error("state I/O error: {reason}")]
    Io { reason: String, context: Context },
    /// The region's stored payload did not decode as the expected map.
    #[error("state decode error: {reason}")]
    Decode { reason: String, context: Context },
    /// A `set`/`update`/`clear`/`cancel_update` was issued without a prior
    /// `get_for_update` holding the lock.
    #[error("no transaction in progress for this state handle")]
    NoTransaction,
}

impl StateError {
    #[must_use]
    pub fn io(reason: impl Into<String>) -> Self {
        Self::Io { reason: reason.into(), context: context([]) }
    }

    #[must_use]
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode { reason: reason.into(), context: context([]) }
    }
}

/// A key/value scope backing one of the three template-visible states.
///
/// `locals` and `shared` implementations never fail; `globals` crosses a
/// file lock and can. The trait is kept fallible uniformly so templates can
/// treat all three scopes the same way.
pub trait State {
    /// Look up `key`. `None` if absent.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] from the backing store (global state only).
    fn get(&self, key: &str) -> Result<Option<Value>, StateError>;

    /// Look up `key`, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] from the backing store (global state only).
    fn get_or(&self, key: &str, default: Value) -> Result<Value, StateError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Overwrite `key` with `value`.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] from the backing store (global state only).
    fn set(&self, key: &str, value: Value) -> Result<(), StateError>;

    /// Merge `entries` into the scope, overwriting any existing keys.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] from the backing store (global state only).
    fn update(&self, entries: &[(String, Value)]) -> Result<(), StateError>;

    /// Remove every key from the scope.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] from the backing store (global state only).
    fn clear(&self) -> Result<(), StateError>;

    /// Snapshot the whole scope as a map. Intended for metrics reporting.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] from the backing store (global state only).
    fn as_map(&self) -> Result<serde_json::Map<String, Value>, StateError>;
}

/// Transactional read-modify-write extension over [`State`].
///
/// Only the global scope implements this: `get_for_update` acquires the
/// cross-process lock and holds it until the matching `set`/`update`/
/// `clear`/`cancel_update` call (spec §5, §8 property 6). Local and shared
/// state need no transaction handle since they are already single-writer.
pub trait TransactionalState: State {
    /// Acquire the lock, returning the current value for `key`. The lock is
    /// held until a subsequent `set`/`update`/`clear`/`cancel_update` call.
    ///
    /// # Errors
    ///
    /// Propagates a [`StateError`] if the lock cannot be acquired.
    fn get_for_update(&self, key: &str) -> Result<Option<Value>, StateError>;

    /// Release a lock taken by `get_for_update` without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NoTransaction`] if no transaction is in progress.
    fn cancel_update(&self) -> Result<(), StateError>;
}

#[cfg(test)]
mod tests {
    use super::{State, StateError};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct MapState {
        inner: RefCell<BTreeMap<String, Value>>,
    }

    impl State for MapState {
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

    #[test]
    fn set_then_get_round_trips() {
        let state = MapState { inner: RefCell::new(BTreeMap::new()) };
        state.set("count", json!(1)).unwrap();
        assert_eq!(state.get("count").unwrap(), Some(json!(1)));
    }

    #[test]
    fn update_merges_without_clearing() {
        let state = MapState { inner: RefCell::new(BTreeMap::new()) };
        state.set("a", json!(1)).unwrap();
        state.update(&[("b".to_owned(), json!(2))]).unwrap();
        assert_eq!(state.get("a").unwrap(), Some(json!(1)));
        assert_eq!(state.get("b").unwrap(), Some(json!(2)));
    }

    #[test]
    fn clear_then_get_or_returns_default() {
        let state = MapState { inner: RefCell::new(BTreeMap::new()) };
        state.set("k", json!(1)).unwrap();
        state.clear().unwrap();
        assert_eq!(state.get_or("k", json!("d")).unwrap(), json!("d"));
    }
}
