//! Release preparation: upload artifacts and register the release.

use super::changelog::render_markdown;
use super::index::{ReleaseArtifact, ReleaseEntry, ReleaseIndex};
use super::{ChangelogEntry, ChangelogService};
use crate::clients::UpdateApiClient;
use crate::config::ReleaseConfig;
use crate::error::{Result, WorkflowError};
use crate::storage::Filesystem;
use crate::version::{ReleaseVersion, VersionParser};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

/// Archives picked up from the artifacts directory
const ARCHIVE_KINDS: [&str; 2] = ["install", "update"];

/// Prepares releases on the deploy filesystem
#[derive(Debug, Clone)]
pub struct ReleasePrepareService {
    config: Arc<ReleaseConfig>,
    deploy_fs: Arc<dyn Filesystem>,
    artifacts_fs: Arc<dyn Filesystem>,
    changelog: ChangelogService,
    update_api: UpdateApiClient,
    parser: VersionParser,
}

impl ReleasePrepareService {
    /// Create a preparation service
    pub fn new(
        config: Arc<ReleaseConfig>,
        deploy_fs: Arc<dyn Filesystem>,
        artifacts_fs: Arc<dyn Filesystem>,
        changelog: ChangelogService,
        update_api: UpdateApiClient,
    ) -> Self {
        Self {
            config,
            deploy_fs,
            artifacts_fs,
            changelog,
            update_api,
            parser: VersionParser::new(),
        }
    }

    /// Deploy filesystem
    pub fn deploy_fs(&self) -> &Arc<dyn Filesystem> {
        &self.deploy_fs
    }

    /// Fetch the changelog from Jira and prepare the release
    pub async fn prepare_release(&self, tag: &str) -> Result<ReleaseEntry> {
        let version = self.parser.parse(tag)?;
        let changelog = self.changelog.get_changelog(&version.to_string()).await?;
        self.prepare_with_changelog(tag, changelog).await
    }

    /// Prepare the release with an already collected changelog.
    ///
    /// Uploads the archives found in the artifacts directory, writes the
    /// changelog next to them and records a non-public index entry.
    pub async fn prepare_with_changelog(
        &self,
        tag: &str,
        changelog: Vec<ChangelogEntry>,
    ) -> Result<ReleaseEntry> {
        let version = self.parser.parse(tag)?;
        let version_str = version.to_string();
        let mut index = ReleaseIndex::load(self.deploy_fs.as_ref()).await?;

        if index.find(&version_str).is_some_and(|entry| entry.public) {
            return Err(WorkflowError::AlreadyReleased {
                version: version_str,
            }
            .into());
        }

        let mut entry = ReleaseEntry {
            version: version_str.clone(),
            tag: tag.to_string(),
            stability: self.config.stability,
            release_date: Utc::now(),
            public: false,
            changelog,
            install: None,
            update: None,
        };

        for kind in ARCHIVE_KINDS {
            let artifact = self.upload_archive(kind, &version_str).await?;
            match kind {
                "install" => entry.install = artifact,
                _ => entry.update = artifact,
            }
        }

        let markdown = render_markdown(&version_str, &entry.changelog);
        self.artifacts_fs
            .write(&format!("CHANGELOG-{version_str}.md"), Bytes::from(markdown))
            .await?;

        index.upsert(entry.clone());
        index.save(self.deploy_fs.as_ref()).await?;
        log::info!(
            "Prepared release {} on {}",
            version_str,
            self.deploy_fs.location()
        );

        if self.update_api.is_configured() {
            self.update_api.insert_release_data(&entry).await?;
        } else {
            log::info!("UPDATE_API_HOST not set, skipping update API notification");
        }

        Ok(entry)
    }

    /// Whether an index entry exists for the version
    pub async fn is_prepared(&self, version: &ReleaseVersion) -> Result<bool> {
        let index = ReleaseIndex::load(self.deploy_fs.as_ref()).await?;
        Ok(index.find(&version.to_string()).is_some())
    }

    /// Make a prepared release public
    pub async fn publish(&self, version: &ReleaseVersion) -> Result<ReleaseEntry> {
        let version_str = version.to_string();
        let mut index = ReleaseIndex::load(self.deploy_fs.as_ref()).await?;

        let entry = index
            .find_mut(&version_str)
            .ok_or_else(|| WorkflowError::NotPrepared {
                version: version_str.clone(),
            })?;
        if entry.public {
            return Err(WorkflowError::AlreadyReleased {
                version: version_str,
            }
            .into());
        }
        entry.public = true;
        let entry = entry.clone();

        index.save(self.deploy_fs.as_ref()).await?;

        if self.update_api.is_configured() {
            self.update_api.publish_release(&version_str).await?;
        }

        Ok(entry)
    }

    async fn upload_archive(&self, kind: &str, version: &str) -> Result<Option<ReleaseArtifact>> {
        let source = format!("{kind}.zip");
        if !self.artifacts_fs.has(&source).await? {
            log::warn!("No {source} in {}, skipping", self.artifacts_fs.location());
            return Ok(None);
        }

        let data = self.artifacts_fs.read(&source).await?;
        let target = format!("sw6/{kind}_{version}.zip");
        let artifact = ReleaseArtifact::new(self.deploy_fs.public_url(&target), &data);
        self.deploy_fs.write(&target, data).await?;

        Ok(Some(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReleaseOptions;
    use crate::clients::JiraClient;
    use crate::config::JiraCredentials;
    use crate::env::EnvConfig;
    use crate::error::ReleaseError;
    use crate::storage::LocalFilesystem;
    use crate::version::Stability;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        _temp: tempfile::TempDir,
        deploy: Arc<LocalFilesystem>,
        artifacts: Arc<LocalFilesystem>,
        service: ReleasePrepareService,
    }

    fn fixture(tag: &str) -> Fixture {
        fixture_with_update_api(tag, "")
    }

    fn fixture_with_update_api(tag: &str, update_host: &str) -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let deploy = Arc::new(LocalFilesystem::new(temp.path().join("deploy")));
        let artifacts = Arc::new(LocalFilesystem::new(temp.path().join("artifacts")));

        let options = ReleaseOptions {
            tag: Some(tag.to_string()),
            ..ReleaseOptions::default()
        };
        let config = ReleaseConfig::build(
            &EnvConfig::default(),
            &options,
            JiraCredentials::default(),
            &VersionParser::new(),
        )
        .unwrap();
        let changelog =
            ChangelogService::new(JiraClient::new(&config.jira).unwrap(), "NEXT");

        let service = ReleasePrepareService::new(
            Arc::new(config),
            deploy.clone(),
            artifacts.clone(),
            changelog,
            UpdateApiClient::new(update_host).unwrap(),
        );

        Fixture {
            _temp: temp,
            deploy,
            artifacts,
            service,
        }
    }

    fn changelog() -> Vec<ChangelogEntry> {
        vec![ChangelogEntry {
            key: "NEXT-1".to_string(),
            summary: "Fix cart rounding".to_string(),
            issue_type: "Bug".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_prepare_uploads_archives_and_records_entry() {
        let f = fixture("v6.5.0.0-rc1");
        f.artifacts
            .write("install.zip", Bytes::from_static(b"install"))
            .await
            .unwrap();

        let entry = f
            .service
            .prepare_with_changelog("v6.5.0.0-rc1", changelog())
            .await
            .unwrap();

        assert_eq!(entry.version, "6.5.0.0-RC1");
        assert_eq!(entry.stability, Stability::Rc);
        assert!(!entry.public);
        assert_eq!(entry.install.as_ref().unwrap().size, 7);
        assert!(entry.update.is_none());

        assert!(f.deploy.has("sw6/install_6.5.0.0-RC1.zip").await.unwrap());
        assert!(f.artifacts.has("CHANGELOG-6.5.0.0-RC1.md").await.unwrap());

        let index = ReleaseIndex::load(f.deploy.as_ref()).await.unwrap();
        assert_eq!(index.find("6.5.0.0-RC1"), Some(&entry));
    }

    #[tokio::test]
    async fn test_publish_requires_preparation() {
        let f = fixture("v6.5.0.0");
        let version = VersionParser::new().parse("v6.5.0.0").unwrap();

        let err = f.service.publish(&version).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Workflow(WorkflowError::NotPrepared { .. })));
        assert!(!f.service.is_prepared(&version).await.unwrap());
    }

    #[tokio::test]
    async fn test_publish_then_prepare_again_is_rejected() {
        let f = fixture("v6.5.0.0");
        let version = VersionParser::new().parse("v6.5.0.0").unwrap();

        f.service
            .prepare_with_changelog("v6.5.0.0", changelog())
            .await
            .unwrap();
        assert!(f.service.is_prepared(&version).await.unwrap());

        let published = f.service.publish(&version).await.unwrap();
        assert!(published.public);

        let err = f
            .service
            .prepare_with_changelog("v6.5.0.0", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Workflow(WorkflowError::AlreadyReleased { .. })));
    }

    #[tokio::test]
    async fn test_update_api_is_notified_on_prepare_and_publish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/release/insert"))
            .and(body_partial_json(json!({
                "version": "6.5.0.0",
                "tag": "v6.5.0.0",
                "stability": "stable",
                "public": false
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/release/publish"))
            .and(body_json(json!({"version": "6.5.0.0"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let f = fixture_with_update_api("v6.5.0.0", &server.uri());
        let version = VersionParser::new().parse("v6.5.0.0").unwrap();

        f.service
            .prepare_with_changelog("v6.5.0.0", changelog())
            .await
            .unwrap();
        f.service.publish(&version).await.unwrap();
    }
}
