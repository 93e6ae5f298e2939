//! Product mapping store
//!
//! Durable, lock-guarded bidirectional table internal-id ↔ external-id.
//! `load()` parses the JSON file, validates every record, and rebuilds the
//! forward and reverse in-memory indices as one owned snapshot; lookups are
//! pure in-memory reads against that snapshot. `save()` replaces the file
//! wholesale under the exclusive file lock.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::Deserialize;
use shared::mapping::MappingFile;
use shared::{SyncError, SyncResult};

use super::lock::FileLock;
use super::write_atomic;

/// Raw file shape used for structural validation on load.
///
/// `version` and `mappings` must be present; entry values are validated
/// individually so one bad record cannot fail the whole load.
#[derive(Debug, Deserialize)]
struct RawMappingFile {
    #[allow(dead_code)]
    version: String,
    mappings: serde_json::Map<String, serde_json::Value>,
}

/// In-memory snapshot rebuilt by every `load()`
#[derive(Debug, Default)]
struct Indices {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
}

pub struct MappingStore {
    path: PathBuf,
    lock: FileLock,
    /// `None` until the first successful `load()`
    cache: RwLock<Option<Indices>>,
}

impl MappingStore {
    pub fn new(path: PathBuf) -> Self {
        let lock = FileLock::for_file(&path);
        Self {
            path,
            lock,
            cache: RwLock::new(None),
        }
    }

    /// Load the persisted table and rebuild the in-memory indices.
    ///
    /// Returns the number of valid mappings. A missing file is not an
    /// error: an empty, schema-valid file is created and 0 is returned.
    /// Invalid records (either side empty or not a string) are skipped and
    /// logged; malformed top-level JSON or a missing `version`/`mappings`
    /// key fails the load.
    pub async fn load(&self) -> SyncResult<usize> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no mapping file, creating empty one");
                self.persist(&BTreeMap::new()).await?;
                self.install(Indices::default());
                return Ok(0);
            }
            Err(e) => return Err(SyncError::Io(e)),
        };

        let file: RawMappingFile = serde_json::from_str(&raw)
            .map_err(|e| SyncError::parse(self.path.display().to_string(), e))?;

        let mut indices = Indices::default();
        for (internal_id, value) in &file.mappings {
            let Some(external_id) = value.as_str() else {
                tracing::warn!(
                    internal_id = %internal_id,
                    "skipping mapping record: external id is not a string"
                );
                continue;
            };
            if internal_id.trim().is_empty() || external_id.trim().is_empty() {
                tracing::warn!(
                    internal_id = %internal_id,
                    external_id,
                    "skipping mapping record: empty id"
                );
                continue;
            }
            if indices.reverse.contains_key(external_id) {
                tracing::warn!(
                    internal_id = %internal_id,
                    external_id,
                    "skipping mapping record: external id already mapped"
                );
                continue;
            }
            indices
                .forward
                .insert(internal_id.clone(), external_id.to_string());
            indices
                .reverse
                .insert(external_id.to_string(), internal_id.clone());
        }

        let count = indices.forward.len();
        self.install(indices);
        tracing::debug!(count, path = %self.path.display(), "mapping table loaded");
        Ok(count)
    }

    /// Replace the persisted table with `mappings` (full replacement,
    /// never a merge), under the exclusive file lock.
    pub async fn save(&self, mappings: &BTreeMap<String, String>) -> SyncResult<()> {
        self.persist(mappings).await
    }

    /// External id for an internal id, from the loaded snapshot
    pub fn external_id(&self, internal_id: &str) -> SyncResult<Option<String>> {
        self.with_indices(|idx| idx.forward.get(internal_id).cloned())
    }

    /// Internal id for an external id, from the loaded snapshot
    pub fn internal_id(&self, external_id: &str) -> SyncResult<Option<String>> {
        self.with_indices(|idx| idx.reverse.get(external_id).cloned())
    }

    /// Snapshot of all known internal ids
    pub fn internal_ids(&self) -> SyncResult<Vec<String>> {
        self.with_indices(|idx| {
            let mut ids: Vec<String> = idx.forward.keys().cloned().collect();
            ids.sort();
            ids
        })
    }

    /// Snapshot of all known external ids
    pub fn external_ids(&self) -> SyncResult<Vec<String>> {
        self.with_indices(|idx| {
            let mut ids: Vec<String> = idx.reverse.keys().cloned().collect();
            ids.sort();
            ids
        })
    }

    /// Number of loaded mappings (0 before the first load)
    pub fn len(&self) -> usize {
        self.cache
            .read()
            .ok()
            .and_then(|c| c.as_ref().map(|idx| idx.forward.len()))
            .unwrap_or(0)
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.read().is_ok_and(|c| c.is_some())
    }

    async fn persist(&self, mappings: &BTreeMap<String, String>) -> SyncResult<()> {
        let _guard = self.lock.acquire().await?;
        let file = MappingFile::with_mappings(mappings.clone());
        let bytes = serde_json::to_vec_pretty(&file)
            .map_err(|e| SyncError::parse(self.path.display().to_string(), e))?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }

    fn install(&self, indices: Indices) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(indices);
        }
    }

    fn with_indices<T>(&self, f: impl FnOnce(&Indices) -> T) -> SyncResult<T> {
        let cache = self.cache.read().map_err(|_| SyncError::StoreNotLoaded)?;
        match cache.as_ref() {
            Some(indices) => Ok(f(indices)),
            None => Err(SyncError::StoreNotLoaded),
        }
    }
}
