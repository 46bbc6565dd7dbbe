//! Query history: a capped, persisted log of past resolutions.
//!
//! [`QueryHistory`] owns the authoritative in-memory list (newest first,
//! capped at [`MAX_ENTRIES`]); a [`HistoryStore`] persists it. Persistence
//! is whole-list replace-on-write: every mutation rewrites the serialized
//! list atomically, so a partially-written snapshot can never be observed.
//!
//! Loading is tolerant by design — a malformed persisted payload is treated
//! as empty history, and individually malformed entries are dropped
//! silently rather than failing the load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::HistoryEntry;

/// Maximum number of retained history entries; the oldest are evicted.
pub const MAX_ENTRIES: usize = 10;

/// Default file stem for the persisted history list.
pub const DEFAULT_STORE_NAME: &str = "aiDashboardQueries.json";

/// Persistence backend for the history list.
///
/// `load` returns the raw persisted records so the caller can validate each
/// entry's shape individually; `persist` replaces the whole snapshot.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read the persisted list. Unreadable or unparsable data yields an
    /// empty list, never an error.
    async fn load(&self) -> Vec<Value>;

    /// Atomically replace the persisted list with the given entries.
    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()>;
}

#[async_trait]
impl<S: HistoryStore + ?Sized> HistoryStore for std::sync::Arc<S> {
    async fn load(&self) -> Vec<Value> {
        (**self).load().await
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        (**self).persist(entries).await
    }
}

/// The capped, newest-first history list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
}

impl QueryHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, evicting beyond the cap.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Remove the entry with the given id. No-op when absent; relative
    /// order of the remaining entries is unchanged.
    pub fn remove(&mut self, id: Uuid) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Empty the list.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the list wholesale with a persisted snapshot, validating
    /// each record's shape and the result invariant. Malformed records are
    /// dropped silently. Returns the number of entries kept.
    pub fn load(&mut self, persisted: Vec<Value>) -> usize {
        self.entries = persisted
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<HistoryEntry>(raw).ok())
            .filter(|entry| entry.result.is_well_formed())
            .take(MAX_ENTRIES)
            .collect();
        debug!(kept = self.entries.len(), "history loaded");
        self.entries.len()
    }

    /// The entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// History store backed by a single local JSON file.
///
/// The list is read once at startup and rewritten on every mutation using
/// write-then-rename, so readers never observe a partial write. A missing
/// or corrupt file is treated as empty history.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    file_path: PathBuf,
}

impl FileHistoryStore {
    /// Create a store over the given file path. The file is created lazily
    /// on first persist.
    #[must_use]
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Create a store using [`DEFAULT_STORE_NAME`] under the given directory.
    #[must_use]
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_STORE_NAME))
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = self.file_path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> Vec<Value> {
        let raw = match fs::read_to_string(&self.file_path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(path = %self.file_path.display(), %err, "history file unreadable, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) | Err(_) => {
                warn!(path = %self.file_path.display(), "history file malformed, starting empty");
                Vec::new()
            }
        }
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::persistence(format!("failed to serialize history: {e}")))?;

        // Write-then-rename keeps the snapshot atomic.
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::persistence(format!("failed to create history file: {e}")))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| Error::persistence(format!("failed to write history file: {e}")))?;
        file.flush()
            .await
            .map_err(|e| Error::persistence(format!("failed to flush history file: {e}")))?;
        drop(file);

        fs::rename(&temp_path, &self.file_path)
            .await
            .map_err(|e| Error::persistence(format!("failed to replace history file: {e}")))?;
        Ok(())
    }
}

/// In-memory history store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    snapshot: RwLock<Vec<Value>>,
}

impl InMemoryHistoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self) -> Vec<Value> {
        self.snapshot.read().await.clone()
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = entries
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::persistence(format!("failed to serialize history: {e}")))?;
        *self.snapshot.write().await = raw;
        Ok(())
    }
}
