//! Release tagging in GitLab and the split sub-repositories.

use crate::clients::{GitLabClient, GitLabTag};
use crate::config::ReleaseConfig;
use crate::error::{Result, VersionError, WorkflowError};
use crate::version::{ReleaseVersion, VersionParser};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;

/// Planned tag for one sub-repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTag {
    /// Sub-repository name
    pub name: String,
    /// Local working copy
    pub path: PathBuf,
    /// Remote to push the tag to
    pub remote_url: String,
    /// Tag name
    pub tag: String,
}

/// Creates release tags
#[derive(Debug, Clone)]
pub struct TaggingService {
    parser: VersionParser,
    config: Arc<ReleaseConfig>,
    gitlab: GitLabClient,
}

impl TaggingService {
    /// Create a tagging service
    pub fn new(parser: VersionParser, config: Arc<ReleaseConfig>, gitlab: GitLabClient) -> Self {
        Self {
            parser,
            config,
            gitlab,
        }
    }

    /// Parse a tag and check it against the configured minimum version
    pub fn validate_tag(&self, tag: &str) -> Result<ReleaseVersion> {
        let version = self.parser.parse(tag)?;

        if !self.config.minimum_version.is_empty() {
            let minimum = self.parser.parse(&self.config.minimum_version)?;
            if version < minimum {
                return Err(VersionError::BelowMinimum {
                    version: version.to_string(),
                    minimum: minimum.to_string(),
                }
                .into());
            }
        }

        Ok(version)
    }

    /// Whether the tag already exists in GitLab
    pub async fn tag_exists(&self, tag: &str) -> Result<bool> {
        Ok(self
            .gitlab
            .get_tag(&self.config.project_id, tag)
            .await?
            .is_some())
    }

    /// Create the release tag on the target branch
    pub async fn create_release_tag(&self, tag: &str) -> Result<GitLabTag> {
        let version = self.validate_tag(tag)?;

        if self.tag_exists(tag).await? {
            return Err(WorkflowError::TagExists {
                tag: tag.to_string(),
            }
            .into());
        }

        self.gitlab
            .create_tag(
                &self.config.project_id,
                tag,
                &self.config.target_branch,
                &format!("Release {version}"),
            )
            .await
    }

    /// Remove a release tag from GitLab
    pub async fn delete_release_tag(&self, tag: &str) -> Result<()> {
        self.gitlab.delete_tag(&self.config.project_id, tag).await
    }

    /// Tags that `tag_repositories` would create
    pub fn repository_plan(&self, tag: &str) -> Vec<RepoTag> {
        self.config
            .repos
            .iter()
            .map(|(name, repo)| RepoTag {
                name: name.clone(),
                path: repo.path.clone(),
                remote_url: repo.remote_url.clone(),
                tag: tag.to_string(),
            })
            .collect()
    }

    /// Tag every checked-out sub-repository and push the tag.
    ///
    /// Repositories without a local checkout are skipped. Returns the names
    /// of the repositories that were tagged.
    pub async fn tag_repositories(&self, tag: &str) -> Result<Vec<String>> {
        let version = self.validate_tag(tag)?;
        let message = format!("Release {version}");
        let mut tagged = Vec::new();

        for repo in self.repository_plan(tag) {
            if !repo.path.join(".git").exists() {
                log::warn!(
                    "Skipping {}: no git checkout at {}",
                    repo.name,
                    repo.path.display()
                );
                continue;
            }

            run_git(&repo, &["tag", "-a", tag, "-m", &message]).await?;
            run_git(&repo, &["push", &repo.remote_url, &format!("refs/tags/{tag}")]).await?;
            log::info!("Tagged {} with {}", repo.name, tag);
            tagged.push(repo.name);
        }

        Ok(tagged)
    }
}

async fn run_git(repo: &RepoTag, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .arg("-C")
        .arg(&repo.path)
        .args(args)
        .output()
        .await
        .map_err(|e| WorkflowError::Git {
            repo: repo.name.clone(),
            command: args.first().copied().unwrap_or_default().to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(WorkflowError::Git {
            repo: repo.name.clone(),
            command: args.first().copied().unwrap_or_default().to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReleaseOptions;
    use crate::config::JiraCredentials;
    use crate::env::EnvConfig;
    use crate::error::ReleaseError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(env: EnvConfig) -> TaggingService {
        let parser = VersionParser::new();
        let config = ReleaseConfig::build(
            &env,
            &ReleaseOptions::default(),
            JiraCredentials::default(),
            &parser,
        )
        .unwrap();
        let gitlab = GitLabClient::new(&config.gitlab_base_uri, &config.gitlab_api_token).unwrap();
        TaggingService::new(parser, Arc::new(config), gitlab)
    }

    #[test]
    fn test_validate_tag_against_minimum() {
        let tagging = service(EnvConfig::from_pairs([("MINIMUM_VERSION", "6.4.0.0")]));

        assert!(tagging.validate_tag("v6.4.20.0").is_ok());
        assert!(tagging.validate_tag("v6.4.0.0").is_ok());
        assert!(tagging.validate_tag("v6.3.5.0").is_err());
        assert!(tagging.validate_tag("v6.4.0.0-rc1").is_err());
    }

    #[test]
    fn test_validate_tag_against_default_minimum() {
        let tagging = service(EnvConfig::default());
        assert!(tagging.validate_tag("v5.0.0").is_err());
        assert!(tagging.validate_tag("v6.1.0.0").is_err());
        assert!(tagging.validate_tag("v6.2.1.0").is_ok());
        assert!(tagging.validate_tag("latest").is_err());
    }

    #[test]
    fn test_repository_plan_covers_all_sub_repositories() {
        let tagging = service(EnvConfig::from_pairs([
            ("PROJECT_ROOT", "/builds/platform"),
            ("MANY_REPO_BASE_URL", "https://gitlab.example.com/product"),
        ]));
        let plan = tagging.repository_plan("v6.5.0.0");

        assert_eq!(plan.len(), 5);
        let storefront = plan.iter().find(|r| r.name == "storefront").unwrap();
        assert_eq!(storefront.path, PathBuf::from("/builds/platform/repos/storefront"));
        assert_eq!(storefront.remote_url, "https://gitlab.example.com/product/storefront");
        assert!(plan.iter().all(|r| r.tag == "v6.5.0.0"));
    }

    #[tokio::test]
    async fn test_tag_repositories_skips_missing_checkouts() {
        let temp = tempfile::tempdir().unwrap();
        let tagging = service(EnvConfig::from_pairs([(
            "PROJECT_ROOT",
            temp.path().to_string_lossy().to_string(),
        )]));

        let tagged = tagging.tag_repositories("v6.5.0.0").await.unwrap();
        assert!(tagged.is_empty());
    }

    #[tokio::test]
    async fn test_create_release_tag_on_target_branch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/42/repository/tags/v6.5.0.0"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/projects/42/repository/tags"))
            .and(body_json(json!({
                "tag_name": "v6.5.0.0",
                "ref": "trunk",
                "message": "Release 6.5.0.0"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "v6.5.0.0",
                "target": "abc123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tagging = service(EnvConfig::from_pairs([
            ("CI_PROJECT_ID", "42".to_string()),
            ("CI_API_V4_URL", server.uri()),
            ("TARGET_BRANCH", "trunk".to_string()),
        ]));
        let tag = tagging.create_release_tag("v6.5.0.0").await.unwrap();
        assert_eq!(tag.target, "abc123");
    }

    #[tokio::test]
    async fn test_existing_tag_is_not_recreated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/42/repository/tags/v6.5.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "v6.5.0.0",
                "target": "abc123"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let tagging = service(EnvConfig::from_pairs([
            ("CI_PROJECT_ID", "42".to_string()),
            ("CI_API_V4_URL", server.uri()),
        ]));
        let err = tagging.create_release_tag("v6.5.0.0").await.unwrap_err();
        assert!(matches!(err, ReleaseError::Workflow(WorkflowError::TagExists { .. })));
    }
}
