use chrono::Utc;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::CatalogError;
use super::metrics::record_operation;
use super::pointer::PointerStore;
use super::storage::{is_valid_key, Storage};
use crate::models::AssetPointer;

/// Descriptive fields recorded alongside a published asset.
#[derive(Debug, Clone, Default)]
pub struct PublishMetadata {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub title: Option<String>,
}

/// Owns the catalog slot: the asset bytes and the pointer naming them.
///
/// Publish and remove are serialized by an in-process lock around the
/// pointer read-modify-write sequence. Processes sharing one storage root
/// still race, last writer wins.
pub struct CatalogService {
    storage: Arc<dyn Storage>,
    pointers: PointerStore,
    lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(storage: Arc<dyn Storage>, pointer_key: impl Into<String>) -> Self {
        Self {
            pointers: PointerStore::new(storage.clone(), pointer_key),
            storage,
            lock: Mutex::new(()),
        }
    }

    /// The currently published pointer, read fresh from storage.
    pub async fn current(&self) -> Result<Option<AssetPointer>, CatalogError> {
        self.pointers.read().await
    }

    /// Installs `data` at `declared_path` and points the catalog at it.
    ///
    /// The bytes are durable before the pointer names them, so a crash can
    /// leave an orphaned asset but never a pointer to missing bytes.
    pub async fn publish(
        &self,
        data: Vec<u8>,
        declared_path: &str,
        metadata: PublishMetadata,
    ) -> Result<AssetPointer, CatalogError> {
        let result = self.publish_inner(data, declared_path, metadata).await;
        record_operation("publish", outcome(&result));
        result
    }

    async fn publish_inner(
        &self,
        data: Vec<u8>,
        declared_path: &str,
        metadata: PublishMetadata,
    ) -> Result<AssetPointer, CatalogError> {
        if !self.is_asset_key(declared_path) {
            return Err(CatalogError::InvalidPath(declared_path.to_string()));
        }

        let _guard = self.lock.lock().await;

        let previous = match self.pointers.read().await {
            Ok(previous) => previous,
            Err(CatalogError::PointerCorrupt(e)) => {
                tracing::warn!(error = %e, "Replacing corrupt asset pointer");
                None
            }
            Err(e) => return Err(e),
        };

        let size = data.len() as u64;
        self.storage
            .upload(declared_path, data)
            .await
            .map_err(|source| match source.kind() {
                // Collides with an existing blob or directory.
                ErrorKind::InvalidInput => CatalogError::InvalidPath(declared_path.to_string()),
                _ => CatalogError::WriteFailed {
                    path: declared_path.to_string(),
                    source,
                },
            })?;

        let pointer = AssetPointer {
            path: declared_path.to_string(),
            file_name: metadata.file_name,
            content_type: metadata.content_type,
            size: Some(size),
            title: metadata.title,
            published_at: Some(Utc::now()),
        };

        if let Err(e) = self.pointers.write(&pointer).await {
            tracing::warn!(
                path = %declared_path,
                "Pointer write failed, leaving orphaned catalog asset"
            );
            return Err(e);
        }

        let superseded = previous.filter(|old| {
            old.path != pointer.path && self.is_asset_key(&old.path)
        });
        if let Some(old) = superseded {
            match self.storage.delete(&old.path).await {
                Ok(_) => tracing::info!(path = %old.path, "Removed superseded catalog asset"),
                Err(e) => tracing::warn!(
                    path = %old.path,
                    error = %e,
                    "Failed to remove superseded catalog asset"
                ),
            }
        }

        tracing::info!(path = %pointer.path, size = size, "Catalog published");
        Ok(pointer)
    }

    /// Deletes the published asset and its pointer.
    ///
    /// Succeeds when nothing is published. The pointer's claim is probed
    /// rather than trusted, so a pointer whose asset is already gone is
    /// simply cleared. Asset and pointer cleanup are attempted independently
    /// and every failure is reported.
    pub async fn remove(&self) -> Result<(), CatalogError> {
        let result = self.remove_inner().await;
        record_operation("remove", outcome(&result));
        result
    }

    async fn remove_inner(&self) -> Result<(), CatalogError> {
        let _guard = self.lock.lock().await;

        let asset_path = match self.pointers.read().await {
            Ok(Some(pointer)) => Some(pointer.path),
            Ok(None) => {
                tracing::debug!("No catalog published, nothing to remove");
                return Ok(());
            }
            Err(CatalogError::PointerCorrupt(e)) => {
                tracing::warn!(error = %e, "Asset pointer is corrupt, clearing it without asset cleanup");
                None
            }
            Err(e) => return Err(e),
        };

        let mut failures = Vec::new();

        if let Some(path) = asset_path {
            if let Err(e) = self.delete_asset(&path).await {
                failures.push(e);
            }
        }

        if let Err(e) = self.pointers.clear().await {
            failures.push(e);
        }

        if failures.is_empty() {
            tracing::info!("Catalog removed");
            Ok(())
        } else {
            Err(CatalogError::RemoveFailed(failures))
        }
    }

    async fn delete_asset(&self, path: &str) -> Result<(), CatalogError> {
        let failed = |source: std::io::Error| CatalogError::AssetDeleteFailed {
            path: path.to_string(),
            source,
        };

        if !self.is_asset_key(path) {
            tracing::warn!(path = %path, "Asset pointer names an invalid path, skipping asset cleanup");
            return Ok(());
        }

        if !self.storage.exists(path).await.map_err(failed)? {
            tracing::warn!(path = %path, "Asset pointer referenced a missing catalog asset");
            return Ok(());
        }

        self.storage.delete(path).await.map_err(failed)?;
        tracing::info!(path = %path, "Deleted catalog asset");
        Ok(())
    }

    /// Asset keys must be valid storage keys distinct from the pointer record.
    fn is_asset_key(&self, key: &str) -> bool {
        is_valid_key(key) && key != self.pointers.key()
    }
}

fn outcome<T>(result: &Result<T, CatalogError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "failure"
    }
}
