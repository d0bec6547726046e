//! Release index stored on the deploy filesystem.

use super::ChangelogEntry;
use crate::error::{ReleaseError, Result, StorageError};
use crate::storage::Filesystem;
use crate::version::Stability;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Key of the index document
pub const RELEASE_INDEX: &str = "index.json";

/// Uploaded release archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    /// Public download location
    pub uri: String,
    /// Size in bytes
    pub size: u64,
    /// Hex SHA-1 digest
    pub sha1: String,
    /// Hex SHA-256 digest
    pub sha256: String,
}

impl ReleaseArtifact {
    /// Describe `data` published at `uri`
    pub fn new(uri: String, data: &[u8]) -> Self {
        Self {
            uri,
            size: data.len() as u64,
            sha1: hex::encode(Sha1::digest(data)),
            sha256: hex::encode(Sha256::digest(data)),
        }
    }
}

/// One release in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEntry {
    /// Normalized version
    pub version: String,
    /// Tag the release was prepared from
    pub tag: String,
    /// Release stability
    pub stability: Stability,
    /// When the entry was last prepared
    pub release_date: DateTime<Utc>,
    /// Whether the release is visible to shops
    pub public: bool,
    /// Changelog entries
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
    /// Install archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<ReleaseArtifact>,
    /// Update archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<ReleaseArtifact>,
}

/// All known releases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseIndex {
    /// Releases in insertion order
    #[serde(default)]
    pub releases: Vec<ReleaseEntry>,
}

impl ReleaseIndex {
    /// Load the index; a missing document is an empty index
    pub async fn load(fs: &dyn Filesystem) -> Result<Self> {
        match fs.read(RELEASE_INDEX).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(ReleaseError::Storage(StorageError::NotFound { .. })) => {
                log::debug!("No release index at {}, starting empty", fs.location());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Write the index back
    pub async fn save(&self, fs: &dyn Filesystem) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        fs.write(RELEASE_INDEX, Bytes::from(json)).await
    }

    /// Entry for a normalized version
    pub fn find(&self, version: &str) -> Option<&ReleaseEntry> {
        self.releases.iter().find(|r| r.version == version)
    }

    /// Mutable entry for a normalized version
    pub fn find_mut(&mut self, version: &str) -> Option<&mut ReleaseEntry> {
        self.releases.iter_mut().find(|r| r.version == version)
    }

    /// Replace the entry with the same version or append it
    pub fn upsert(&mut self, entry: ReleaseEntry) {
        match self.find_mut(&entry.version) {
            Some(existing) => *existing = entry,
            None => self.releases.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalFilesystem;

    fn entry(version: &str, public: bool) -> ReleaseEntry {
        ReleaseEntry {
            version: version.to_string(),
            tag: format!("v{version}"),
            stability: Stability::Stable,
            release_date: Utc::now(),
            public,
            changelog: Vec::new(),
            install: None,
            update: None,
        }
    }

    #[test]
    fn test_artifact_digests() {
        let artifact = ReleaseArtifact::new("deploy/sw6/install.zip".to_string(), b"abc");
        assert_eq!(artifact.size, 3);
        assert_eq!(artifact.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            artifact.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_upsert_replaces_same_version() {
        let mut index = ReleaseIndex::default();
        index.upsert(entry("6.5.0.0", false));
        index.upsert(entry("6.5.1.0", false));
        index.upsert(entry("6.5.0.0", true));

        assert_eq!(index.releases.len(), 2);
        assert!(index.find("6.5.0.0").unwrap().public);
    }

    #[tokio::test]
    async fn test_load_missing_index_is_empty_and_save_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new(temp.path());

        let mut index = ReleaseIndex::load(&fs).await.unwrap();
        assert!(index.releases.is_empty());

        index.upsert(entry("6.5.0.0", false));
        index.save(&fs).await.unwrap();

        let reloaded = ReleaseIndex::load(&fs).await.unwrap();
        assert_eq!(reloaded, index);
    }
}
