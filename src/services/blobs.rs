//! Blob storage for image renditions

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

/// Files addressed by a relative, `/`-separated path
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a blob, creating parent directories as needed
    async fn write(&self, path: &str, data: Vec<u8>) -> AppResult<()>;

    /// Fails with `NotFound` when the blob does not exist
    async fn read(&self, path: &str) -> AppResult<Vec<u8>>;

    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// Blob store rooted in a local directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and the given top-level directories
    pub async fn ensure_dirs(&self, dirs: &[&str]) -> AppResult<()> {
        for dir in dirs {
            let full = self.resolve(dir)?;
            tokio::fs::create_dir_all(&full).await.map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", full.display(), e))
            })?;
        }
        Ok(())
    }

    /// Map a relative blob path under the root, refusing anything that
    /// could escape it
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !is_plain {
            return Err(AppError::Storage(format!("Invalid blob path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn write(&self, path: &str, data: Vec<u8>) -> AppResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&full, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path, e)))
    }

    async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Image file {} not found", path)))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to read {}: {}", path, e))),
        }
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Image file {} not found", path)))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to delete {}: {}", path, e))),
        }
    }
}
