use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::{JsonFileStore, KeyValueStore, MemoryStore, NoopStore};

/// Typed handle over a [`KeyValueStore`].
///
/// Values are stored as JSON. Failures are logged and never propagated:
/// reads fall back to the caller's default and writes report `false`.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Storage with no backing store; reads are empty, writes are dropped.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopStore))
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open a file store at `dir`, falling back to [`Storage::noop`] when the
    /// directory cannot be created.
    pub fn open_or_noop(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match JsonFileStore::new(&dir) {
            Ok(store) => Self::new(Arc::new(store)),
            Err(e) => {
                tracing::warn!(
                    "Storage unavailable at {}, state will not persist: {}",
                    dir.display(),
                    e
                );
                Self::noop()
            }
        }
    }

    /// Read `key`, returning `default` when absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::error!("Error reading from storage for key {:?}: {}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Error parsing stored value for key {:?}: {}", key, e);
                default
            }
        }
    }

    /// Write `value` under `key`. Returns whether the write succeeded.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error serializing value for key {:?}: {}", key, e);
                return false;
            }
        };

        match self.store.set_item(key, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error writing to storage for key {:?}: {}", key, e);
                false
            }
        }
    }

    /// Remove `key`. Returns whether the removal succeeded.
    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error removing from storage for key {:?}: {}", key, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
