//! Filesystem abstraction for release artifacts.
//!
//! Two adapters exist: a local directory and an S3 bucket. Both address
//! files by slash-separated relative keys.

mod local;
mod s3;

pub use local::LocalFilesystem;
pub use s3::S3Filesystem;

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;

/// Where a filesystem stores its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Directory on local disk
    Local {
        /// Root directory
        root: PathBuf,
    },
    /// S3 bucket
    S3 {
        /// Bucket name
        bucket: String,
        /// Bucket region
        region: String,
        /// Public URL prefix
        public_domain: String,
    },
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLocation::Local { root } => write!(f, "{}", root.display()),
            StorageLocation::S3 { bucket, .. } => write!(f, "s3://{bucket}"),
        }
    }
}

/// Storage for release artifacts and metadata
#[async_trait]
pub trait Filesystem: Send + Sync + fmt::Debug {
    /// Where files end up
    fn location(&self) -> StorageLocation;

    /// URL or path under which a stored file is reachable
    fn public_url(&self, path: &str) -> String;

    /// Read a whole file
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Create or replace a file
    async fn write(&self, path: &str, contents: Bytes) -> Result<()>;

    /// Whether a file exists
    async fn has(&self, path: &str) -> Result<bool>;
}

/// Validate a relative key and strip leading slashes
pub(crate) fn normalize_key(path: &str) -> Result<String> {
    let key = path.trim_start_matches('/');
    if key.is_empty() || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
        }
        .into());
    }
    Ok(key.to_string())
}
