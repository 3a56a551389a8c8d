//! Append-only log of visited scene ids.
//!
//! Feeds the breadcrumb/history UI only; navigation never depends on it, so
//! every failure here is reported as a value and treated as non-fatal by the
//! engine.

use serde::{Deserialize, Serialize};

/// Persisted form: just the ordered id list.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub visited: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::StorageUnavailable => write!(f, "browser storage unavailable"),
            HistoryError::Corrupt(msg) => write!(f, "history storage corrupt: {msg}"),
            HistoryError::Io(msg) => write!(f, "history storage error: {msg}"),
        }
    }
}

impl std::error::Error for HistoryError {}

pub trait HistoryStore {
    /// Record one more visited scene. Append-only: repeat visits append
    /// again, preserving the actual path taken.
    fn append(&mut self, scene_id: &str) -> Result<(), HistoryError>;
    fn visited(&self) -> Result<Vec<String>, HistoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    snapshot: HistorySnapshot,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&mut self, scene_id: &str) -> Result<(), HistoryError> {
        self.snapshot.visited.push(scene_id.to_string());
        Ok(())
    }

    fn visited(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self.snapshot.visited.clone())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{HistoryError, HistorySnapshot, HistoryStore};

    #[derive(Debug)]
    pub struct LocalStorageHistoryStore {
        key: String,
    }

    impl LocalStorageHistoryStore {
        pub fn new(key: impl Into<String>) -> Result<Self, HistoryError> {
            let store = Self { key: key.into() };
            // Touch storage up front so a blocked/unavailable localStorage
            // surfaces at construction, not mid-tour.
            store.load()?;
            Ok(store)
        }

        fn load(&self) -> Result<HistorySnapshot, HistoryError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.key)
                .map_err(|e| HistoryError::Io(format!("get_item failed: {:?}", e)))?;
            let Some(raw) = raw else {
                return Ok(HistorySnapshot::default());
            };
            if raw.trim().is_empty() {
                return Ok(HistorySnapshot::default());
            }
            serde_json::from_str(&raw).map_err(|e| HistoryError::Corrupt(e.to_string()))
        }

        fn save(&self, snapshot: &HistorySnapshot) -> Result<(), HistoryError> {
            let storage = window_local_storage()?;
            let raw =
                serde_json::to_string(snapshot).map_err(|e| HistoryError::Io(e.to_string()))?;
            storage
                .set_item(&self.key, &raw)
                .map_err(|e| HistoryError::Io(format!("set_item failed: {:?}", e)))
        }
    }

    impl HistoryStore for LocalStorageHistoryStore {
        fn append(&mut self, scene_id: &str) -> Result<(), HistoryError> {
            let mut snapshot = self.load()?;
            snapshot.visited.push(scene_id.to_string());
            self.save(&snapshot)
        }

        fn visited(&self) -> Result<Vec<String>, HistoryError> {
            Ok(self.load()?.visited)
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, HistoryError> {
        let win = web_sys::window().ok_or(HistoryError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| HistoryError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(HistoryError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageHistoryStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageHistoryStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageHistoryStore {
    pub fn new(_key: impl Into<String>) -> Result<Self, HistoryError> {
        Err(HistoryError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HistoryStore for LocalStorageHistoryStore {
    fn append(&mut self, _scene_id: &str) -> Result<(), HistoryError> {
        Err(HistoryError::StorageUnavailable)
    }

    fn visited(&self) -> Result<Vec<String>, HistoryError> {
        Err(HistoryError::StorageUnavailable)
    }
}
