//! Local directory filesystem.

use super::{Filesystem, StorageLocation, normalize_key};
use crate::error::{Result, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Filesystem rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    /// Create a filesystem rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<(String, PathBuf)> {
        let key = normalize_key(path)?;
        let full = self.root.join(&key);
        Ok((key, full))
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    fn location(&self) -> StorageLocation {
        StorageLocation::Local {
            root: self.root.clone(),
        }
    }

    fn public_url(&self, path: &str) -> String {
        self.root
            .join(path.trim_start_matches('/'))
            .display()
            .to_string()
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let (key, full) = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound { path: key }.into())
            }
            Err(source) => Err(StorageError::Local {
                operation: "read".to_string(),
                path: full,
                source,
            }
            .into()),
        }
    }

    async fn write(&self, path: &str, contents: Bytes) -> Result<()> {
        let (_, full) = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Local {
                    operation: "create_dir".to_string(),
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        log::debug!("Writing {} bytes to {}", contents.len(), full.display());
        tokio::fs::write(&full, &contents)
            .await
            .map_err(|source| StorageError::Local {
                operation: "write".to_string(),
                path: full,
                source,
            })?;
        Ok(())
    }

    async fn has(&self, path: &str) -> Result<bool> {
        let (_, full) = self.resolve(path)?;
        tokio::fs::try_exists(&full)
            .await
            .map_err(|source| {
                StorageError::Local {
                    operation: "stat".to_string(),
                    path: full,
                    source,
                }
                .into()
            })
    }
}
