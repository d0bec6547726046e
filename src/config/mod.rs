//! Release configuration assembled from environment, options and credentials.

mod credentials;

pub use credentials::{
    CredentialPrompt, CredentialResolver, DEFAULT_JIRA_API_URI, JiraCredentials, TerminalPrompt,
};

use crate::cli::ReleaseOptions;
use crate::env::EnvConfig;
use crate::error::{ConfigError, Result};
use crate::version::{Stability, VersionParser};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Sub-repositories split out of the platform repository
pub const SUB_REPOSITORIES: [&str; 5] =
    ["core", "administration", "storefront", "elasticsearch", "recovery"];

/// S3 bucket receiving release artifacts
pub const DEPLOY_BUCKET: &str = "releases.s3.shopware.com";

/// Public domain serving the deploy bucket
pub const DEPLOY_PUBLIC_DOMAIN: &str = "https://releases.shopware.com";

/// Region of the deploy bucket
pub const DEPLOY_REGION: &str = "eu-central-1";

/// Local deploy directory used when not deploying to S3
pub const LOCAL_DEPLOY_DIR: &str = "deploy";

/// Directory under the project root holding built artifacts
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Lowest release version when `MINIMUM_VERSION` is unset
pub const DEFAULT_MINIMUM_VERSION: &str = "6.2.1";

const REDACTED: &str = "********";

/// Deploy target settings
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DeployTarget {
    /// AWS access key id
    pub access_key_id: String,
    /// AWS secret access key
    pub secret_access_key: String,
    /// Bucket region
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Public URL prefix for uploaded files
    pub public_domain: String,
}

impl fmt::Debug for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployTarget")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("public_domain", &self.public_domain)
            .finish()
    }
}

/// Local checkout and remote of one sub-repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoDescriptor {
    /// Local working copy
    pub path: PathBuf,
    /// Remote URL to push to
    pub remote_url: String,
}

/// Immutable configuration snapshot for one command invocation
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseConfig {
    /// Lowest version this branch may release
    pub minimum_version: String,
    /// GitLab project id
    pub project_id: String,
    /// GitLab API v4 base URI
    pub gitlab_base_uri: String,
    /// GitLab repository URL
    pub gitlab_remote_url: String,
    /// GitLab API token
    pub gitlab_api_token: String,
    /// Branch tags are created on
    pub target_branch: String,
    /// Base URL of the split sub-repositories
    pub many_repos_base_url: String,
    /// Platform checkout root
    pub project_root: PathBuf,
    /// Deploy bucket and credentials
    pub deploy: DeployTarget,
    /// Platform branch name
    pub platform_branch: String,
    /// Resolved stability
    pub stability: Stability,
    /// Tag argument, verbatim
    pub tag: Option<String>,
    /// Update API host
    pub update_api_host: String,
    /// Jira project key used for changelog queries
    pub jira_project_key: String,
    /// Jira credentials
    pub jira: JiraCredentials,
    /// Sub-repository descriptors by name
    pub repos: BTreeMap<String, RepoDescriptor>,
}

impl fmt::Debug for ReleaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseConfig")
            .field("minimum_version", &self.minimum_version)
            .field("project_id", &self.project_id)
            .field("gitlab_base_uri", &self.gitlab_base_uri)
            .field("gitlab_remote_url", &self.gitlab_remote_url)
            .field("gitlab_api_token", &REDACTED)
            .field("target_branch", &self.target_branch)
            .field("many_repos_base_url", &self.many_repos_base_url)
            .field("project_root", &self.project_root)
            .field("deploy", &self.deploy)
            .field("platform_branch", &self.platform_branch)
            .field("stability", &self.stability)
            .field("tag", &self.tag)
            .field("update_api_host", &self.update_api_host)
            .field("jira_project_key", &self.jira_project_key)
            .field("jira", &self.jira)
            .field("repos", &self.repos)
            .finish()
    }
}

impl ReleaseConfig {
    /// Build the configuration.
    ///
    /// Missing environment values fall back to empty strings or literal
    /// defaults; only an unparseable stability name is rejected.
    pub fn build(
        env: &EnvConfig,
        options: &ReleaseOptions,
        jira: JiraCredentials,
        parser: &VersionParser,
    ) -> Result<Self> {
        let stability = resolve_stability(env, options, parser)?;
        let project_root = env.get_or("PROJECT_ROOT", ".");
        let many_repos_base_url = env.get_or_empty("MANY_REPO_BASE_URL");

        let repos = SUB_REPOSITORIES
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    RepoDescriptor {
                        path: PathBuf::from(format!("{project_root}/repos/{name}")),
                        remote_url: format!("{many_repos_base_url}/{name}"),
                    },
                )
            })
            .collect();

        let config = Self {
            minimum_version: env.get_or("MINIMUM_VERSION", DEFAULT_MINIMUM_VERSION),
            project_id: env.get_or_empty("CI_PROJECT_ID"),
            gitlab_base_uri: with_trailing_slash(&env.get_or_empty("CI_API_V4_URL")),
            gitlab_remote_url: env.get_or_empty("CI_REPOSITORY_URL"),
            gitlab_api_token: env.get_or_empty("BOT_API_TOKEN"),
            target_branch: env.get_or_empty("TARGET_BRANCH"),
            many_repos_base_url,
            project_root: PathBuf::from(project_root),
            deploy: DeployTarget {
                access_key_id: env.get_or_empty("AWS_ACCESS_KEY_ID"),
                secret_access_key: env.get_or_empty("AWS_SECRET_ACCESS_KEY"),
                region: DEPLOY_REGION.to_string(),
                bucket: DEPLOY_BUCKET.to_string(),
                public_domain: DEPLOY_PUBLIC_DOMAIN.to_string(),
            },
            platform_branch: env.get_or_empty("PLATFORM_BRANCH"),
            stability,
            tag: options.tag.clone(),
            update_api_host: env.get_or_empty("UPDATE_API_HOST"),
            jira_project_key: env.get_or("JIRA_PROJECT_KEY", "NEXT"),
            jira,
            repos,
        };

        log::debug!(
            "Built release configuration: project={} branch={} stability={} tag={:?}",
            config.project_id,
            config.target_branch,
            config.stability,
            config.tag
        );

        Ok(config)
    }

    /// Directory holding locally built artifacts
    pub fn artifacts_dir(&self) -> PathBuf {
        self.project_root.join(ARTIFACTS_DIR)
    }

    /// Copy with every token, password and secret key masked
    pub fn redacted(&self) -> Self {
        let mask = |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                REDACTED.to_string()
            }
        };

        let mut copy = self.clone();
        copy.gitlab_api_token = mask(&self.gitlab_api_token);
        copy.deploy.secret_access_key = mask(&self.deploy.secret_access_key);
        copy.jira.api_password = mask(&self.jira.api_password);
        copy
    }

    /// Names of auth-related values that are empty
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("BOT_API_TOKEN", self.gitlab_api_token.is_empty()),
            ("JIRA_API_USER", self.jira.api_user.is_empty()),
            ("JIRA_API_PASSWORD", self.jira.api_password.is_empty()),
            ("AWS_ACCESS_KEY_ID", self.deploy.access_key_id.is_empty()),
            ("AWS_SECRET_ACCESS_KEY", self.deploy.secret_access_key.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Exactly one trailing slash; an unset value stays empty
fn with_trailing_slash(uri: &str) -> String {
    let trimmed = uri.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Resolve the stability: option, minimum-stability option, `STABILITY`, then the tag
fn resolve_stability(
    env: &EnvConfig,
    options: &ReleaseOptions,
    parser: &VersionParser,
) -> Result<Stability> {
    let explicit = [
        ("--stability", options.stability.clone()),
        ("--minimum-stability", options.minimum_stability.clone()),
        ("STABILITY", env.get("STABILITY")),
    ];

    for (source_name, value) in explicit {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            return value.parse().map_err(|_| {
                ConfigError::InvalidStability {
                    value,
                    source_name: source_name.to_string(),
                }
                .into()
            });
        }
    }

    Ok(parser.parse_stability(options.tag.as_deref().unwrap_or_default()))
}
