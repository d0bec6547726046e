//! Release orchestration: tag a prepared release and publish it.

use super::{ReleaseEntry, ReleasePrepareService, TaggingService};
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result, WorkflowError};
use crate::version::ReleaseVersion;
use std::sync::Arc;

/// Outcome of a release
#[derive(Debug, Clone)]
pub struct ReleaseSummary {
    /// Normalized version
    pub version: String,
    /// Tag that was created
    pub tag: String,
    /// Commit the tag points at
    pub commit: String,
    /// Sub-repositories that received the tag
    pub repositories: Vec<String>,
    /// Public install archive location, if uploaded
    pub install_uri: Option<String>,
}

/// Runs the final release steps
#[derive(Debug, Clone)]
pub struct ReleaseService {
    config: Arc<ReleaseConfig>,
    prepare: ReleasePrepareService,
    tagging: TaggingService,
}

impl ReleaseService {
    /// Create a release service
    pub fn new(
        config: Arc<ReleaseConfig>,
        prepare: ReleasePrepareService,
        tagging: TaggingService,
    ) -> Self {
        Self {
            config,
            prepare,
            tagging,
        }
    }

    /// Release a prepared tag: create tags, then make the release public
    pub async fn release_tag(&self, tag: &str) -> Result<ReleaseSummary> {
        let version = self.tagging.validate_tag(tag)?;

        if !self.prepare.is_prepared(&version).await? {
            return Err(WorkflowError::NotPrepared {
                version: version.to_string(),
            }
            .into());
        }

        log::info!(
            "Releasing {} from branch {} (stability {})",
            version,
            self.config.target_branch,
            self.config.stability
        );

        let gitlab_tag = self.tagging.create_release_tag(tag).await?;

        let (repositories, entry) = match self.tag_and_publish(tag, &version).await {
            Ok(done) => done,
            Err(e) => {
                self.remove_tag_after_failure(tag, &e).await;
                return Err(e);
            }
        };

        Ok(ReleaseSummary {
            version: entry.version,
            tag: gitlab_tag.name,
            commit: gitlab_tag.target,
            repositories,
            install_uri: entry.install.map(|artifact| artifact.uri),
        })
    }

    async fn tag_and_publish(
        &self,
        tag: &str,
        version: &ReleaseVersion,
    ) -> Result<(Vec<String>, ReleaseEntry)> {
        let repositories = self.tagging.tag_repositories(tag).await?;
        let entry = self.prepare.publish(version).await?;
        Ok((repositories, entry))
    }

    /// Delete the GitLab tag of a release that did not complete
    async fn remove_tag_after_failure(&self, tag: &str, cause: &ReleaseError) {
        log::error!("Release of {tag} failed after the GitLab tag was created: {cause}");

        match self.tagging.delete_release_tag(tag).await {
            Ok(()) => log::warn!(
                "Deleted GitLab tag {tag}; tags already pushed to sub-repositories are kept"
            ),
            Err(e) => log::error!(
                "GitLab tag {tag} in project {} is left behind ({e}); delete it before retrying",
                self.config.project_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReleaseOptions;
    use crate::clients::{GitLabClient, JiraClient, UpdateApiClient};
    use crate::config::JiraCredentials;
    use crate::env::EnvConfig;
    use crate::services::{ChangelogService, ReleaseIndex};
    use crate::storage::LocalFilesystem;
    use crate::version::VersionParser;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TAG: &str = "v6.5.0.0";
    const TAG_PATH: &str = "/projects/42/repository/tags/v6.5.0.0";

    struct Fixture {
        temp: tempfile::TempDir,
        deploy: Arc<LocalFilesystem>,
        prepare: ReleasePrepareService,
        service: ReleaseService,
    }

    fn fixture(server: &MockServer) -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let project_root = temp.path().join("platform");
        let env = EnvConfig::from_pairs([
            ("CI_PROJECT_ID", "42".to_string()),
            ("CI_API_V4_URL", server.uri()),
            ("BOT_API_TOKEN", "glpat-123".to_string()),
            ("TARGET_BRANCH", "trunk".to_string()),
            ("PROJECT_ROOT", project_root.to_string_lossy().to_string()),
        ]);
        let options = ReleaseOptions {
            tag: Some(TAG.to_string()),
            ..ReleaseOptions::default()
        };
        let parser = VersionParser::new();
        let config = Arc::new(
            ReleaseConfig::build(&env, &options, JiraCredentials::default(), &parser).unwrap(),
        );

        let deploy = Arc::new(LocalFilesystem::new(temp.path().join("deploy")));
        let prepare = ReleasePrepareService::new(
            config.clone(),
            deploy.clone(),
            Arc::new(LocalFilesystem::new(config.artifacts_dir())),
            ChangelogService::new(JiraClient::new(&config.jira).unwrap(), "NEXT"),
            UpdateApiClient::new("").unwrap(),
        );
        let gitlab = GitLabClient::new(&config.gitlab_base_uri, &config.gitlab_api_token).unwrap();
        let tagging = TaggingService::new(parser, config.clone(), gitlab);
        let service = ReleaseService::new(config, prepare.clone(), tagging);

        Fixture {
            temp,
            deploy,
            prepare,
            service,
        }
    }

    async fn mount_tag_creation(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(TAG_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/projects/42/repository/tags"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": TAG,
                "message": "Release 6.5.0.0",
                "target": "abc123"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn is_public(deploy: &LocalFilesystem) -> bool {
        let index = ReleaseIndex::load(deploy).await.unwrap();
        index.find("6.5.0.0").is_some_and(|entry| entry.public)
    }

    #[tokio::test]
    async fn test_release_tags_and_publishes() {
        let server = MockServer::start().await;
        mount_tag_creation(&server).await;
        let f = fixture(&server);
        f.prepare.prepare_with_changelog(TAG, Vec::new()).await.unwrap();

        let summary = f.service.release_tag(TAG).await.unwrap();

        assert_eq!(summary.version, "6.5.0.0");
        assert_eq!(summary.tag, TAG);
        assert_eq!(summary.commit, "abc123");
        assert!(summary.repositories.is_empty());
        assert!(summary.install_uri.is_none());
        assert!(is_public(&f.deploy).await);
    }

    #[tokio::test]
    async fn test_unprepared_release_creates_no_tag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let f = fixture(&server);

        let err = f.service.release_tag(TAG).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Workflow(WorkflowError::NotPrepared { .. })));
    }

    #[tokio::test]
    async fn test_failed_repository_tagging_removes_gitlab_tag() {
        let server = MockServer::start().await;
        mount_tag_creation(&server).await;
        Mock::given(method("DELETE"))
            .and(path(TAG_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let f = fixture(&server);
        f.prepare.prepare_with_changelog(TAG, Vec::new()).await.unwrap();

        // checkout whose git dir does not exist
        let core = f.temp.path().join("platform/repos/core");
        std::fs::create_dir_all(&core).unwrap();
        std::fs::write(core.join(".git"), "gitdir: /nonexistent/core.git\n").unwrap();

        let err = f.service.release_tag(TAG).await.unwrap_err();

        assert!(matches!(err, ReleaseError::Workflow(WorkflowError::Git { ref repo, .. }) if repo == "core"));
        assert!(!is_public(&f.deploy).await);
    }
}
