// Rust guideline compliant 2026-02-16

//! Cross-process global state (spec §3): a MessagePack-encoded map stored in
//! a memory-mapped, file-locked region so every running process of the same
//! generator shares one `globals` scope.
//!
//! Locking uses the standard library's native file locking rather than a
//! bespoke lock file protocol; the lock and the data region live in the same
//! file so there is exactly one handle to manage.

use domain::errors::context;
use domain::{InitError, State, StateError, TransactionalState};
use log::{debug, warn};
use memmap2::MmapMut;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;

const HEADER_SIZE: usize = 8;
const BUFFER_SIZE: u64 = 1024 * 1024;
const DEFAULT_NAME: &str = "eventum-jinja-globals";

/// A key/value scope shared across every process of one generator,
/// backed by a memory-mapped region and guarded by an OS file lock.
pub struct GlobalState {
    mmap: RefCell<MmapMut>,
    lock_file: File,
    locked: Cell<bool>,
    pending: RefCell<serde_json::Map<String, Value>>,
    creator: bool,
    path: PathBuf,
}

impl std::fmt::Debug for GlobalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalState")
            .field("path", &self.path)
            .field("creator", &self.creator)
            .field("locked", &self.locked.get())
            .finish()
    }
}

impl GlobalState {
    /// Open (or create) the well-known global state region.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if the backing file cannot be created, sized,
    /// or memory-mapped.
    pub fn new() -> Result<Self, InitError> {
        Self::named(DEFAULT_NAME)
    }

    /// Open (or create) a named global state region. Distinct names are
    /// fully independent scopes; tests use this to avoid colliding on the
    /// well-known name.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if the backing file cannot be created, sized,
    /// or memory-mapped.
    pub fn named(name: &str) -> Result<Self, InitError> {
        let path = Self::path_for(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| InitError {
                reason: format!("cannot create global state directory: {e}"),
                context: context([("path", &parent.display().to_string())]),
            })?;
        }

        let (file, creator) = match OpenOptions::new().read(true).write(true).create_new(true).open(&path) {
            Ok(file) => (file, true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let file = OpenOptions::new().read(true).write(true).open(&path).map_err(|e| InitError {
                    reason: format!("cannot open existing global state file: {e}"),
                    context: context([("path", &path.display().to_string())]),
                })?;
                (file, false)
            }
            Err(e) => {
                return Err(InitError {
                    reason: format!("cannot create global state file: {e}"),
                    context: context([("path", &path.display().to_string())]),
                });
            }
        };

        if creator {
            file.set_len(BUFFER_SIZE).map_err(|e| InitError {
                reason: format!("cannot size global state file: {e}"),
                context: context([]),
            })?;
        }

        // SAFETY: the region is private to this process tree and only ever
        // mutated through `GlobalState`'s locked read/write methods, which
        // is the usage memmap2 requires to avoid undefined behavior from
        // concurrent unsynchronized access.
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(|e| InitError {
            reason: format!("cannot memory-map global state file: {e}"),
            context: context([("path", &path.display().to_string())]),
        })?;

        let state = Self {
            mmap: RefCell::new(mmap),
            lock_file: file,
            locked: Cell::new(false),
            pending: RefCell::new(serde_json::Map::new()),
            creator,
            path,
        };

        if creator {
            debug!("creating global state region at {}", state.path.display());
            state.lock_for_internal_write()?;
            let result = state.write_map(&serde_json::Map::new());
            state.unlock_internal();
            result.map_err(|e| InitError { reason: e.to_string(), context: context([]) })?;
        } else {
            debug!("attached to existing global state region at {}", state.path.display());
        }

        Ok(state)
    }

    fn path_for(name: &str) -> PathBuf {
        std::env::temp_dir().join(".eventum_state").join(format!("{name}.bin"))
    }

    fn lock(&self) -> Result<(), StateError> {
        self.lock_file
            .lock()
            .map_err(|e| StateError::io(format!("failed to acquire global state lock: {e}")))?;
        self.locked.set(true);
        Ok(())
    }

    fn unlock(&self) -> Result<(), StateError> {
        self.lock_file
            .unlock()
            .map_err(|e| StateError::io(format!("failed to release global state lock: {e}")))?;
        self.locked.set(false);
        Ok(())
    }

    fn lock_for_internal_write(&self) -> Result<(), InitError> {
        self.lock_file
            .lock()
            .map_err(|e| InitError { reason: format!("failed to acquire global state lock: {e}"), context: context([]) })
    }

    fn unlock_internal(&self) {
        let _ = self.lock_file.unlock();
    }

    fn read_map(&self) -> Result<serde_json::Map<String, Value>, StateError> {
        let mmap = self.mmap.borrow();
        let mut len_bytes = [0_u8; HEADER_SIZE];
        len_bytes.copy_from_slice(&mmap[..HEADER_SIZE]);
        let len = u64::from_be_bytes(len_bytes) as usize;
        if len == 0 {
            return Ok(serde_json::Map::new());
        }
        let payload = &mmap[HEADER_SIZE..HEADER_SIZE + len];
        rmp_serde::from_slice(payload).map_err(|e| StateError::decode(format!("cannot decode global state: {e}")))
    }

    fn write_map(&self, map: &serde_json::Map<String, Value>) -> Result<(), StateError> {
        let encoded = rmp_serde::to_vec(map).map_err(|e| StateError::io(format!("cannot encode global state: {e}")))?;
        if HEADER_SIZE as u64 + encoded.len() as u64 > BUFFER_SIZE {
            return Err(StateError::io("global state size limit exceeded"));
        }
        let mut mmap = self.mmap.borrow_mut();
        mmap[..HEADER_SIZE].copy_from_slice(&(encoded.len() as u64).to_be_bytes());
        mmap[HEADER_SIZE..HEADER_SIZE + encoded.len()].copy_from_slice(&encoded);
        mmap.flush().map_err(|e| StateError::io(format!("cannot flush global state: {e}")))?;
        Ok(())
    }

    /// Release the memory mapping and, if this handle created the backing
    /// file, delete it.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the backing file exists but cannot be
    /// removed.
    pub fn cleanup(&self) -> Result<(), StateError> {
        if self.creator {
            std::fs::remove_file(&self.path).map_err(|e| {
                let err = StateError::io(format!("cannot remove global state file: {e}"));
                warn!("{err}");
                err
            })?;
        }
        Ok(())
    }
}

impl State for GlobalState {
    fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        if self.locked.get() {
            return Ok(self.pending.borrow().get(key).cloned());
        }
        self.lock()?;
        let result = self.read_map().map(|map| map.get(key).cloned());
        self.unlock()?;
        result
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        if self.locked.get() {
            self.pending.borrow_mut().insert(key.to_owned(), value);
            let snapshot = self.pending.borrow().clone();
            self.write_map(&snapshot)?;
            return self.unlock();
        }
        self.lock()?;
        let mut map = self.read_map()?;
        map.insert(key.to_owned(), value);
        self.write_map(&map)?;
        self.unlock()
    }

    fn update(&self, entries: &[(String, Value)]) -> Result<(), StateError> {
        if self.locked.get() {
            {
                let mut pending = self.pending.borrow_mut();
                for (key, value) in entries {
                    pending.insert(key.clone(), value.clone());
                }
            }
            let snapshot = self.pending.borrow().clone();
            self.write_map(&snapshot)?;
            return self.unlock();
        }
        self.lock()?;
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        self.write_map(&map)?;
        self.unlock()
    }

    fn clear(&self) -> Result<(), StateError> {
        if self.locked.get() {
            self.pending.borrow_mut().clear();
            self.write_map(&serde_json::Map::new())?;
            return self.unlock();
        }
        self.lock()?;
        self.write_map(&serde_json::Map::new())?;
        self.unlock()
    }

    fn as_map(&self) -> Result<serde_json::Map<String, Value>, StateError> {
        if self.locked.get() {
            return Ok(self.pending.borrow().clone());
        }
        self.lock()?;
        let result = self.read_map();
        self.unlock()?;
        result
    }
}

impl TransactionalState for GlobalState {
    fn get_for_update(&self, key: &str) -> Result<Option<Value>, StateError> {
        if self.locked.get() {
            return Ok(self.pending.borrow().get(key).cloned());
        }
        self.lock()?;
        match self.read_map() {
            Ok(map) => {
                let value = map.get(key).cloned();
                *self.pending.borrow_mut() = map;
                Ok(value)
            }
            Err(e) => {
                let _ = self.unlock();
                Err(e)
            }
        }
    }

    fn cancel_update(&self) -> Result<(), StateError> {
        if !self.locked.get() {
            return Err(StateError::NoTransaction);
        }
        self.unlock()
    }
}

#[cfg(test)]
mod tests {
    use super::GlobalState;
    use domain::{State, TransactionalState};
    use serde_json::json;

    fn fresh(name: &str) -> GlobalState {
        let state = GlobalState::named(name).unwrap();
        state.clear().unwrap();
        state
    }

    #[test]
    fn set_then_get_round_trips_through_the_mapped_file() {
        let state = fresh("test-set-then-get");
        state.set("count", json!(1)).unwrap();
        assert_eq!(state.get("count").unwrap(), Some(json!(1)));
        state.cleanup().unwrap();
    }

    #[test]
    fn get_for_update_holds_the_lock_until_set() {
        let state = fresh("test-transaction");
        state.set("a", json!(1)).unwrap();
        let value = state.get_for_update("a").unwrap();
        assert_eq!(value, Some(json!(1)));
        state.set("a", json!(2)).unwrap();
        assert_eq!(state.get("a").unwrap(), Some(json!(2)));
        state.cleanup().unwrap();
    }

    #[test]
    fn cancel_update_releases_without_writing() {
        let state = fresh("test-cancel");
        state.set("a", json!(1)).unwrap();
        state.get_for_update("a").unwrap();
        state.cancel_update().unwrap();
        assert_eq!(state.get("a").unwrap(), Some(json!(1)));
        state.cleanup().unwrap();
    }

    #[test]
    fn cancel_update_without_transaction_errors() {
        let state = fresh("test-cancel-without-transaction");
        assert!(state.cancel_update().is_err());
        state.cleanup().unwrap();
    }
}
