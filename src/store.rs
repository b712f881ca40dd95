//! Persistent operation store: durable file cache and offline queue.
//!
//! A directory-backed, asynchronous object store with two collections,
//! mirroring what a browser origin keeps in IndexedDB:
//!
//! * `cached-files/` — full copies of submitted files, so a batch survives
//!   a restart while the host is unreachable
//! * `queued-ops/`   — operations attempted while unreachable, replayable
//!   once reachability returns
//!
//! Each record is one JSON file named by its auto-incremented id (file
//! payloads get a `.bin` sibling). Ids are assigned under an async lock;
//! the payload is written before the metadata so a torn write never leaves
//! a listable record without its bytes.
//!
//! ## Failure semantics
//!
//! Everything here is best-effort from the caller's perspective. A store
//! failure degrades offline resilience but must never break the main
//! split-and-download path, so reads return empty collections instead of
//! errors and [`OfflineStore::initialize`] reports missing persistence
//! capability as `false`, not as a panic or an `Err`.

use crate::error::StoreError;
use crate::output::SourceFile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, warn};

const FILES_DIR: &str = "cached-files";
const OPS_DIR: &str = "queued-ops";

/// Milliseconds since the Unix epoch.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A deferred action, persisted for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperationKind {
    /// Split the named files once reachability returns. The bytes live in
    /// the `cached-files` collection; the operation records only names.
    Split { file_names: Vec<String> },
}

/// A queue record: an operation plus identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub id: u64,
    pub kind: OperationKind,
    pub queued_at_ms: u64,
}

/// Metadata for one cached file. The payload is stored separately and
/// fetched by id via [`OfflineStore::load_file_bytes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFile {
    pub id: u64,
    pub name: String,
    pub media_type: String,
    pub byte_len: u64,
    pub stored_at_ms: u64,
}

#[derive(Debug)]
struct StoreState {
    next_file_id: u64,
    next_op_id: u64,
}

/// Directory-backed persistent store. Injectable: construct one per
/// application root and share it as `Arc<OfflineStore>`; there is no
/// process-wide singleton.
#[derive(Debug)]
pub struct OfflineStore {
    root: PathBuf,
    state: RwLock<Option<StoreState>>,
}

impl OfflineStore {
    /// Bind a store to its root directory. No I/O happens until
    /// [`initialize`](Self::initialize) (or the first lazy write).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: RwLock::new(None),
        }
    }

    fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    fn ops_dir(&self) -> PathBuf {
        self.root.join(OPS_DIR)
    }

    /// Open (creating if needed) the store.
    ///
    /// Returns `false` when the host offers no persistence at this root
    /// (directory cannot be created); callers degrade gracefully. Calling
    /// again after a successful open is a no-op returning `true`.
    pub async fn initialize(&self) -> bool {
        let mut state = self.state.write().await;
        if state.is_some() {
            return true;
        }

        for dir in [self.files_dir(), self.ops_dir()] {
            if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                warn!("store unavailable, cannot create {}: {e}", dir.display());
                return false;
            }
        }

        let next_file_id = max_record_id(&self.files_dir()).await + 1;
        let next_op_id = max_record_id(&self.ops_dir()).await + 1;
        debug!(
            "store ready at {} (next file id {next_file_id}, next op id {next_op_id})",
            self.root.display()
        );
        *state = Some(StoreState {
            next_file_id,
            next_op_id,
        });
        true
    }

    /// Lazily open the store, then hand out the next id for a collection.
    async fn allocate_id(&self, for_files: bool) -> Result<u64, StoreError> {
        {
            let state = self.state.read().await;
            if state.is_none() {
                drop(state);
                if !self.initialize().await {
                    return Err(StoreError::Unavailable);
                }
            }
        }
        let mut state = self.state.write().await;
        let state = state.as_mut().ok_or(StoreError::Unavailable)?;
        let id = if for_files {
            let id = state.next_file_id;
            state.next_file_id += 1;
            id
        } else {
            let id = state.next_op_id;
            state.next_op_id += 1;
            id
        };
        Ok(id)
    }

    /// Persist a full copy of a submitted file.
    ///
    /// Best-effort by contract: callers must treat an `Err` as a degraded
    /// feature, not as a reason to abort the split.
    pub async fn store_file(&self, file: &SourceFile) -> Result<u64, StoreError> {
        let id = self.allocate_id(true).await?;
        let record = CachedFile {
            id,
            name: file.name.clone(),
            media_type: file.media_type.clone(),
            byte_len: file.byte_len(),
            stored_at_ms: now_ms(),
        };

        let dir = self.files_dir();
        // Payload first, metadata second: a crash between the two leaves
        // no listable record.
        tokio::fs::write(dir.join(format!("{id}.bin")), &file.bytes).await?;
        let json = serde_json::to_vec_pretty(&record)?;
        tokio::fs::write(dir.join(format!("{id}.json")), json).await?;
        debug!("cached file '{}' as id {id}", file.name);
        Ok(id)
    }

    /// All cached files, in insertion (id) order.
    ///
    /// Returns an empty list (never an error) when the store is
    /// unavailable or partially unreadable.
    pub async fn cached_files(&self) -> Vec<CachedFile> {
        let mut records: Vec<CachedFile> = read_records(&self.files_dir()).await;
        records.sort_by_key(|r| r.id);
        records
    }

    /// The payload bytes of one cached file, if present.
    pub async fn load_file_bytes(&self, id: u64) -> Option<Vec<u8>> {
        tokio::fs::read(self.files_dir().join(format!("{id}.bin")))
            .await
            .ok()
    }

    /// Cached files matching a name, in insertion order.
    ///
    /// Names are not unique: resubmitting the same file caches it again
    /// under a fresh id.
    pub async fn cached_files_named(&self, name: &str) -> Vec<CachedFile> {
        self.cached_files()
            .await
            .into_iter()
            .filter(|f| f.name == name)
            .collect()
    }

    /// Delete every cached file. Idempotent; `true` on success.
    pub async fn clear_files(&self) -> bool {
        clear_dir(&self.files_dir()).await
    }

    /// Append an operation to the durable queue.
    pub async fn enqueue_operation(&self, kind: OperationKind) -> Result<u64, StoreError> {
        let id = self.allocate_id(false).await?;
        let record = QueuedOperation {
            id,
            kind,
            queued_at_ms: now_ms(),
        };
        let json = serde_json::to_vec_pretty(&record)?;
        tokio::fs::write(self.ops_dir().join(format!("{id}.json")), json).await?;
        debug!("queued operation {id}");
        Ok(id)
    }

    /// All queued operations, in insertion (id) order. Empty on failure.
    pub async fn queued_operations(&self) -> Vec<QueuedOperation> {
        let mut records: Vec<QueuedOperation> = read_records(&self.ops_dir()).await;
        records.sort_by_key(|r| r.id);
        records
    }

    /// Remove one operation. Idempotent: removing an id that is already
    /// gone reports `true`.
    pub async fn clear_operation(&self, id: u64) -> bool {
        match tokio::fs::remove_file(self.ops_dir().join(format!("{id}.json"))).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("failed to clear operation {id}: {e}");
                false
            }
        }
    }

    /// Remove every queued operation. Idempotent; `true` on success.
    pub async fn clear_all_operations(&self) -> bool {
        clear_dir(&self.ops_dir()).await
    }
}

/// Highest record id present in a collection directory, or 0.
async fn max_record_id(dir: &Path) -> u64 {
    let mut max = 0;
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return 0;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().map_or(false, |e| e.eq_ignore_ascii_case("json")) {
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                max = max.max(id);
            }
        }
    }
    max
}

/// Parse every `.json` record in a directory, skipping unreadable ones.
async fn read_records<T: serde::de::DeserializeOwned>(dir: &Path) -> Vec<T> {
    let mut records = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return records;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !path.extension().map_or(false, |e| e.eq_ignore_ascii_case("json")) {
            continue;
        }
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping corrupt record {}: {e}", path.display()),
            },
            Err(e) => warn!("skipping unreadable record {}: {e}", path.display()),
        }
    }
    records
}

/// Delete every file in a collection directory. Missing directory counts
/// as success (there is nothing to clear).
async fn clear_dir(dir: &Path) -> bool {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return true,
        Err(e) => {
            warn!("failed to list {}: {e}", dir.display());
            return false;
        }
    };
    let mut ok = true;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Err(e) = tokio::fs::remove_file(entry.path()).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove {}: {e}", entry.path().display());
                ok = false;
            }
        }
    }
    ok
}
