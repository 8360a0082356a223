use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Longest accepted storage key, in bytes.
pub const MAX_KEY_LEN: usize = 255;

/// Durable blob storage keyed by relative, `/`-separated names.
///
/// Every write is complete and flushed to stable storage before the future
/// resolves.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fails with `InvalidInput` when `key` cannot name a blob: it is
    /// malformed, names an existing directory, or runs through an existing
    /// blob.
    async fn upload(&self, key: &str, data: Vec<u8>) -> io::Result<()>;

    /// `None` when nothing is stored under `key`.
    async fn download(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    async fn exists(&self, key: &str) -> io::Result<bool>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, key: &str) -> io::Result<bool>;
}

/// A key is valid when it is non-empty, relative, and made only of plain
/// segments (no `.`, `..`, empty segments or backslashes).
pub fn is_valid_key(key: &str) -> bool {
    if key.is_empty() || key.len() > MAX_KEY_LEN || key.contains(['\\', '\0']) {
        return false;
    }
    key.split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> io::Result<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid storage key '{}'", key),
            ));
        }
        Ok(self.base_path.join(key))
    }

    /// Rejects keys whose target is a directory or whose parent chain
    /// passes through an existing file.
    async fn check_blob_slot(&self, key: &str) -> io::Result<()> {
        let mut current = self.base_path.clone();
        let mut segments = key.split('/').peekable();

        while let Some(segment) = segments.next() {
            current.push(segment);
            let is_last = segments.peek().is_none();
            match fs::metadata(&current).await {
                Ok(meta) if is_last && meta.is_dir() => {
                    return Err(slot_conflict(key, "names an existing directory"));
                }
                Ok(meta) if !is_last && !meta.is_dir() => {
                    return Err(slot_conflict(key, "runs through an existing blob"));
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

fn slot_conflict(key: &str, reason: &str) -> io::Error {
    io::Error::new(
        ErrorKind::InvalidInput,
        format!("storage key '{}' {}", key, reason),
    )
}

/// Nothing stored under the key, including when a parent segment is a file.
fn is_absent(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

#[async_trait]
impl Storage for LocalStorage {
    /// Writes to a temporary sibling, fsyncs it, then renames it over the
    /// target so readers never observe a partial file.
    async fn upload(&self, key: &str, data: Vec<u8>) -> io::Result<()> {
        let path = self.resolve(key)?;
        self.check_blob_slot(key).await?;
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_path.clone());
        fs::create_dir_all(&parent).await?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("blob");
        let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        if let Err(e) = write_synced(&tmp_path, &data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        sync_dir(&parent).await
    }

    async fn download(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, key: &str) -> io::Result<bool> {
        let path = self.resolve(key)?;
        match fs::try_exists(path).await {
            Err(e) if is_absent(&e) => Ok(false),
            other => other,
        }
    }

    async fn delete(&self, key: &str) -> io::Result<bool> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                if let Some(parent) = path.parent() {
                    sync_dir(parent).await?;
                }
                Ok(true)
            }
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[cfg(unix)]
async fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
