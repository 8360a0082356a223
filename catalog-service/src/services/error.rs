use service_core::error::AppError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog path '{0}'")]
    InvalidPath(String),

    #[error("Failed to write catalog asset '{path}': {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read asset pointer: {0}")]
    PointerReadFailed(#[source] io::Error),

    #[error("Asset pointer is corrupt: {0}")]
    PointerCorrupt(#[source] serde_json::Error),

    #[error("Failed to write asset pointer: {0}")]
    PointerWriteFailed(#[source] io::Error),

    #[error("Failed to delete catalog asset '{path}': {source}")]
    AssetDeleteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to clear asset pointer: {0}")]
    PointerClearFailed(#[source] io::Error),

    /// One entry per cleanup step that failed.
    #[error("Catalog removal failed: {}", describe(.0))]
    RemoveFailed(Vec<CatalogError>),
}

fn describe(failures: &[CatalogError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidPath(_) => AppError::BadRequest(anyhow::anyhow!(err)),
            other => AppError::StorageError(anyhow::Error::new(other)),
        }
    }
}
