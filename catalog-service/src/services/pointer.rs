use std::sync::Arc;

use super::error::CatalogError;
use super::storage::Storage;
use crate::models::AssetPointer;

/// Single-slot store for the [`AssetPointer`] record, kept under one
/// well-known key. Nothing is cached: every call goes to storage.
pub struct PointerStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl PointerStore {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `Ok(None)` when no pointer has been written.
    pub async fn read(&self) -> Result<Option<AssetPointer>, CatalogError> {
        let Some(raw) = self
            .storage
            .download(&self.key)
            .await
            .map_err(CatalogError::PointerReadFailed)?
        else {
            return Ok(None);
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(CatalogError::PointerCorrupt)
    }

    /// Replaces the current record; durable once this returns.
    pub async fn write(&self, pointer: &AssetPointer) -> Result<(), CatalogError> {
        let raw = serde_json::to_vec_pretty(pointer)
            .map_err(|e| CatalogError::PointerWriteFailed(e.into()))?;

        self.storage
            .upload(&self.key, raw)
            .await
            .map_err(CatalogError::PointerWriteFailed)
    }

    /// Removes the record. Clearing an absent pointer succeeds.
    pub async fn clear(&self) -> Result<(), CatalogError> {
        let removed = self
            .storage
            .delete(&self.key)
            .await
            .map_err(CatalogError::PointerClearFailed)?;

        if !removed {
            tracing::debug!(key = %self.key, "Asset pointer already absent");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::LocalStorage;
    use tempfile::TempDir;

    async fn store() -> (TempDir, PointerStore) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        (dir, PointerStore::new(storage, "catalog.json"))
    }

    #[tokio::test]
    async fn read_returns_none_when_empty() {
        let (_dir, store) = store().await;
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read() {
        let (dir, store) = store().await;
        let mut pointer = AssetPointer::new("catalog/v1.pdf");
        pointer.title = Some("Spring catalog".to_string());

        store.write(&pointer).await.unwrap();

        assert_eq!(store.read().await.unwrap(), Some(pointer));
        assert!(dir.path().join("catalog.json").exists());
    }

    #[tokio::test]
    async fn write_replaces_previous_record() {
        let (_dir, store) = store().await;

        store.write(&AssetPointer::new("a.pdf")).await.unwrap();
        store.write(&AssetPointer::new("b.pdf")).await.unwrap();

        assert_eq!(store.read().await.unwrap().unwrap().path, "b.pdf");
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (_dir, store) = store().await;
        store.write(&AssetPointer::new("a.pdf")).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_record_is_reported() {
        let (dir, store) = store().await;
        std::fs::write(dir.path().join("catalog.json"), b"{not json").unwrap();

        assert!(matches!(
            store.read().await,
            Err(CatalogError::PointerCorrupt(_))
        ));
    }
}
