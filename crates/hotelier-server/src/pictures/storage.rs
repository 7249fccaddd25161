//! Blob storage for picture files.
//!
//! [`BlobStore`] is the seam between the picture sagas and wherever the bytes
//! live. [`LocalDiskStore`] keeps them under a root directory that is also
//! served statically, so a blob key doubles as its URL path.

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hotelier_core::{Error, Result};
use uuid::Uuid;

/// Directory (relative to the store root) holding stashed blobs.
const TRASH_DIR: &str = ".trash";

/// Suffix of files still being written.
const PARTIAL_SUFFIX: &str = ".partial";

/// A blob moved aside by [`BlobStore::stash`], restorable until purged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stashed {
    /// Key the blob had before it was stashed.
    pub key: String,
    /// Where the store parked it.
    pub(crate) trash_key: String,
}

/// Storage backend for picture blobs, addressed by relative key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under `key`. A failed write leaves nothing behind.
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Remove `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Move `key` aside so it can be restored. `None` if it was absent.
    async fn stash(&self, key: &str) -> Result<Option<Stashed>>;

    /// Put a stashed blob back under its original key.
    async fn restore(&self, stashed: &Stashed) -> Result<()>;

    /// Drop a stashed blob for good.
    async fn purge(&self, stashed: &Stashed) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Keys of all complete blobs directly under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Keys of stashed blobs parked longer than `max_age`. These are left
    /// over from deletes that never reached their purge step and can be
    /// removed with [`BlobStore::delete`].
    async fn stale_stashes(&self, max_age: Duration) -> Result<Vec<String>>;
}

fn unix_millis(at: SystemTime) -> u128 {
    at.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

/// Stash time encoded in a trash key (`.trash/<millis>-<uuid>`).
fn stashed_at(trash_key: &str) -> Option<u128> {
    let name = trash_key.rsplit('/').next()?;
    name.split_once('-')?.0.parse().ok()
}

/// Blob store backed by a local directory, every call bounded by a timeout.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
    timeout: Duration,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path under the root, rejecting anything that
    /// could escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        let clean = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(Error::Internal(format!("invalid blob key {key:?}")));
        }
        Ok(self.root.join(rel))
    }

    async fn bounded<T, F>(&self, op: &str, key: &str, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = std::io::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Error::storage(format!("{op} {key}: {e}"))),
            Err(_) => Err(Error::storage(format!(
                "{op} {key}: timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

async fn write_file(path: &Path, partial: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(partial, data).await?;
    tokio::fs::rename(partial, path).await
}

async fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::rename(from, to).await
}

#[async_trait]
impl BlobStore for LocalDiskStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        let partial = self.resolve(&format!("{key}{PARTIAL_SUFFIX}"))?;

        let result = self.bounded("write", key, write_file(&path, &partial, data)).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(key, error = %e, "Failed to remove partial blob");
                }
            }
        }
        result
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        self.bounded("delete", key, remove_if_present(&path)).await
    }

    async fn stash(&self, key: &str) -> Result<Option<Stashed>> {
        let path = self.resolve(key)?;
        let trash_key = format!(
            "{TRASH_DIR}/{}-{}",
            unix_millis(SystemTime::now()),
            Uuid::new_v4()
        );
        let trash = self.resolve(&trash_key)?;

        let moved = self
            .bounded("stash", key, async {
                match move_file(&path, &trash).await {
                    Ok(()) => Ok(true),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                    Err(e) => Err(e),
                }
            })
            .await?;

        Ok(moved.then(|| Stashed {
            key: key.to_string(),
            trash_key,
        }))
    }

    async fn restore(&self, stashed: &Stashed) -> Result<()> {
        let trash = self.resolve(&stashed.trash_key)?;
        let path = self.resolve(&stashed.key)?;
        self.bounded("restore", &stashed.key, move_file(&trash, &path))
            .await
    }

    async fn purge(&self, stashed: &Stashed) -> Result<()> {
        let trash = self.resolve(&stashed.trash_key)?;
        self.bounded("purge", &stashed.key, remove_if_present(&trash))
            .await
            .map(|_| ())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        self.bounded("stat", key, tokio::fs::try_exists(&path)).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.resolve(prefix)?;
        let prefix = prefix.trim_end_matches('/');

        self.bounded("list", prefix, async {
            let mut keys = Vec::new();
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
                Err(e) => return Err(e),
            };
            while let Some(entry) = entries.next_entry().await? {
                if !entry.file_type().await?.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(PARTIAL_SUFFIX) {
                    continue;
                }
                keys.push(format!("{prefix}/{name}"));
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }

    async fn stale_stashes(&self, max_age: Duration) -> Result<Vec<String>> {
        let cutoff = unix_millis(SystemTime::now()).saturating_sub(max_age.as_millis());
        let stale = self
            .list(TRASH_DIR)
            .await?
            .into_iter()
            // Names without a stash time count as stale.
            .filter(|key| stashed_at(key).map_or(true, |at| at <= cutoff))
            .collect();
        Ok(stale)
    }
}
