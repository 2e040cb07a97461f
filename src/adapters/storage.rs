// src/adapters/storage.rs

use crate::core::error::{Error, Result};
use crate::core::models::Snapshot;
use crate::core::ports::Storage;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info};

/// Persists the snapshot as a JSON document.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn load(&self) -> Result<Snapshot> {
        if !tokio::fs::try_exists(&self.path).await? {
            info!(path = %self.path.display(), "No saved state, starting empty.");
            return Ok(Snapshot::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Snapshot::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))?;
        debug!(domains = snapshot.domain_state.len(), "State saved.");
        Ok(())
    }
}

/// Keeps the snapshot in memory only.
#[derive(Default)]
pub struct MemoryStorage {
    snapshot: Mutex<Snapshot>,
}

impl MemoryStorage {
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot: Mutex::new(snapshot) }
    }

    pub fn current(&self) -> Snapshot {
        self.snapshot.lock().clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.current())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.lock() = snapshot.clone();
        Ok(())
    }
}

/// Wraps another storage and publishes every loaded or saved snapshot.
///
/// This is the change feed the front end renders the domain table from.
pub struct WatchedStorage<S> {
    inner: S,
    changes: watch::Sender<Snapshot>,
}

impl<S: Storage> WatchedStorage<S> {
    pub fn new(inner: S) -> (Self, watch::Receiver<Snapshot>) {
        let (changes, receiver) = watch::channel(Snapshot::default());
        (Self { inner, changes }, receiver)
    }
}

#[async_trait]
impl<S: Storage> Storage for WatchedStorage<S> {
    async fn load(&self) -> Result<Snapshot> {
        let snapshot = self.inner.load().await?;
        self.changes.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.inner.save(snapshot).await?;
        self.changes.send_replace(snapshot.clone());
        Ok(())
    }
}
