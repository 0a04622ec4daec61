//! services/app/src/adapters/store.rs
//!
//! This module contains the storage adapters, the concrete implementations
//! of the `StorageService` port from the `core` crate. Durability is
//! simulated with a local key-value layout: string keys mapping to JSON
//! string values.

use async_trait::async_trait;
use bridge_ed_core::ports::{PortError, PortResult, StorageService};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

//=========================================================================================
// File-Backed Store
//=========================================================================================

/// A key-value store backed by a single JSON object file.
///
/// Every mutation rewrites the whole file (load, mutate, rewrite). The store
/// holds only small session-sized records, so this stays cheap. A missing or
/// undecodable file is treated as an empty store, never as a fatal error.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes the load-mutate-rewrite cycle.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a new `JsonFileStore` rooted at `path`. The file is created
    /// lazily on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> PortResult<HashMap<String, String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), "store file is corrupt, starting empty: {e}");
                Ok(HashMap::new())
            }
        }
    }

    async fn save(&self, map: &HashMap<String, String>) -> PortResult<()> {
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl StorageService for JsonFileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        if map.remove(key).is_some() {
            self.save(&map).await?;
        }
        Ok(())
    }
}

//=========================================================================================
// In-Memory Store
//=========================================================================================

/// An ephemeral in-memory store, used by tests and key-less demo runs.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds a key, bypassing the port. Test convenience.
    pub async fn seed(&self, key: &str, value: &str) {
        self.map
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl StorageService for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.map.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        self.map
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.map.lock().await.remove(key);
        Ok(())
    }
}
