//! Order mapping store
//!
//! Append/update log of external-order-id → internal-order-id associations,
//! persisted as an ordered JSON array so upserts scan in insertion order
//! (first match wins). Reads go straight to disk; order volumes are far
//! below the point where this store would need a cached index.

use std::io;
use std::path::PathBuf;

use chrono::Utc;
use shared::mapping::{OrderMappingEntry, OrderMappingFile};
use shared::{SyncError, SyncResult};

use super::lock::FileLock;
use super::write_atomic;

pub struct OrderMappingStore {
    path: PathBuf,
    lock: FileLock,
}

impl OrderMappingStore {
    pub fn new(path: PathBuf) -> Self {
        let lock = FileLock::for_file(&path);
        Self { path, lock }
    }

    /// Upsert one association under the exclusive file lock.
    ///
    /// A repeated save for the same external order id updates the internal
    /// id and `updatedAt` in place rather than appending a duplicate.
    pub async fn save(&self, external_order_id: &str, internal_order_id: &str) -> SyncResult<()> {
        if external_order_id.trim().is_empty() || internal_order_id.trim().is_empty() {
            return Err(SyncError::Validation(
                "order mapping ids must be non-empty".to_string(),
            ));
        }

        let _guard = self.lock.acquire().await?;
        let mut file = self.read_file()?;

        match file
            .mappings
            .iter_mut()
            .find(|m| m.external_order_id == external_order_id)
        {
            Some(entry) => {
                entry.internal_order_id = internal_order_id.to_string();
                entry.updated_at = Some(Utc::now());
            }
            None => file.mappings.push(OrderMappingEntry {
                external_order_id: external_order_id.to_string(),
                internal_order_id: internal_order_id.to_string(),
                created_at: Utc::now(),
                updated_at: None,
            }),
        }

        self.write_file(&file)
    }

    /// Internal order id for an external order id, if one was recorded
    pub fn get(&self, external_order_id: &str) -> SyncResult<Option<String>> {
        Ok(self
            .read_file()?
            .mappings
            .into_iter()
            .find(|m| m.external_order_id == external_order_id)
            .map(|m| m.internal_order_id))
    }

    pub fn exists(&self, external_order_id: &str) -> SyncResult<bool> {
        Ok(self.get(external_order_id)?.is_some())
    }

    /// Administrative removal; returns whether an entry was deleted
    pub async fn delete(&self, external_order_id: &str) -> SyncResult<bool> {
        let _guard = self.lock.acquire().await?;
        let mut file = self.read_file()?;
        let before = file.mappings.len();
        file.mappings
            .retain(|m| m.external_order_id != external_order_id);
        if file.mappings.len() == before {
            return Ok(false);
        }
        self.write_file(&file)?;
        Ok(true)
    }

    /// All recorded associations in insertion order
    pub fn list(&self) -> SyncResult<Vec<OrderMappingEntry>> {
        Ok(self.read_file()?.mappings)
    }

    fn read_file(&self) -> SyncResult<OrderMappingFile> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| SyncError::parse(self.path.display().to_string(), e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(OrderMappingFile::default()),
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    fn write_file(&self, file: &OrderMappingFile) -> SyncResult<()> {
        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| SyncError::parse(self.path.display().to_string(), e))?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> OrderMappingStore {
        OrderMappingStore::new(dir.path().join("order_mappings.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get("MP-1").unwrap(), None);
        assert!(!store.exists("MP-1").unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("MP-1", "SO-100").await.unwrap();
        assert_eq!(store.get("MP-1").unwrap().as_deref(), Some("SO-100"));
        assert!(store.exists("MP-1").unwrap());
    }

    #[tokio::test]
    async fn repeated_save_upserts_instead_of_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("MP-1", "SO-100").await.unwrap();
        store.save("MP-1", "SO-200").await.unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].internal_order_id, "SO-200");
        assert!(entries[0].updated_at.is_some());
    }

    #[tokio::test]
    async fn entries_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("MP-1", "SO-1").await.unwrap();
        store.save("MP-2", "SO-2").await.unwrap();
        store.save("MP-3", "SO-3").await.unwrap();
        store.save("MP-2", "SO-2b").await.unwrap();

        let ids: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|m| m.external_order_id)
            .collect();
        assert_eq!(ids, vec!["MP-1", "MP-2", "MP-3"]);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("MP-1", "SO-100").await.unwrap();
        assert!(store.delete("MP-1").await.unwrap());
        assert!(!store.delete("MP-1").await.unwrap());
        assert_eq!(store.get("MP-1").unwrap(), None);
    }

    #[tokio::test]
    async fn blank_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(matches!(
            store.save("", "SO-1").await.unwrap_err(),
            SyncError::Validation(_)
        ));
        assert!(matches!(
            store.save("MP-1", "  ").await.unwrap_err(),
            SyncError::Validation(_)
        ));
    }
}
