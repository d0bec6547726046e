//! Per-invocation command context.
//!
//! Holds the inputs of one command run and lazily builds the configuration,
//! the deploy filesystem and the services from them. Everything built here
//! is cached for the lifetime of the context.

use crate::cli::ReleaseOptions;
use crate::clients::{GitLabClient, JiraClient, UpdateApiClient};
use crate::config::{
    CredentialPrompt, CredentialResolver, LOCAL_DEPLOY_DIR, ReleaseConfig, TerminalPrompt,
};
use crate::env::EnvConfig;
use crate::error::Result;
use crate::services::{ChangelogService, ReleasePrepareService, ReleaseService, TaggingService};
use crate::storage::{Filesystem, LocalFilesystem, S3Filesystem};
use crate::version::VersionParser;
use std::sync::Arc;

/// Inputs and cached collaborators for one command
pub struct ReleaseContext {
    env: EnvConfig,
    options: ReleaseOptions,
    prompt: Box<dyn CredentialPrompt>,
    parser: VersionParser,
    config: Option<Arc<ReleaseConfig>>,
    deploy_fs: Option<Arc<dyn Filesystem>>,
}

impl ReleaseContext {
    /// Create a context from explicit inputs
    pub fn new(env: EnvConfig, options: ReleaseOptions, prompt: Box<dyn CredentialPrompt>) -> Self {
        Self {
            env,
            options,
            prompt,
            parser: VersionParser::new(),
            config: None,
            deploy_fs: None,
        }
    }

    /// Context reading the process environment and prompting on the terminal
    pub fn from_process(options: ReleaseOptions) -> Self {
        Self::new(EnvConfig::from_process(), options, Box::new(TerminalPrompt))
    }

    /// Command options
    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    /// Environment snapshot
    pub fn env(&self) -> &EnvConfig {
        &self.env
    }

    /// Version parser shared by all services
    pub fn parser(&self) -> VersionParser {
        self.parser
    }

    /// Release configuration, built on first use.
    ///
    /// The first call resolves Jira credentials, which may prompt.
    pub fn config(&mut self) -> Result<Arc<ReleaseConfig>> {
        if let Some(config) = &self.config {
            return Ok(Arc::clone(config));
        }

        let jira = CredentialResolver::new(&self.env, self.prompt.as_ref()).resolve_jira()?;
        let config = Arc::new(ReleaseConfig::build(
            &self.env,
            &self.options,
            jira,
            &self.parser,
        )?);

        self.config = Some(Arc::clone(&config));
        Ok(config)
    }

    /// Filesystem receiving release artifacts, built on first use
    pub fn deploy_filesystem(&mut self) -> Result<Arc<dyn Filesystem>> {
        if let Some(fs) = &self.deploy_fs {
            return Ok(Arc::clone(fs));
        }

        let config = self.config()?;
        let fs: Arc<dyn Filesystem> = if self.options.deploy {
            Arc::new(S3Filesystem::new(&config.deploy))
        } else {
            Arc::new(LocalFilesystem::new(LOCAL_DEPLOY_DIR))
        };
        log::debug!("Deploy filesystem: {}", fs.location());

        self.deploy_fs = Some(Arc::clone(&fs));
        Ok(fs)
    }

    /// Changelog service backed by Jira
    pub fn changelog_service(&mut self) -> Result<ChangelogService> {
        let config = self.config()?;
        let jira = JiraClient::new(&config.jira)?;
        Ok(ChangelogService::new(jira, config.jira_project_key.clone()))
    }

    /// Tagging service backed by GitLab
    pub fn tagging_service(&mut self) -> Result<TaggingService> {
        let config = self.config()?;
        let gitlab = GitLabClient::new(&config.gitlab_base_uri, &config.gitlab_api_token)?;
        Ok(TaggingService::new(self.parser, config, gitlab))
    }

    /// Release preparation service
    pub fn release_prepare_service(&mut self) -> Result<ReleasePrepareService> {
        let config = self.config()?;
        let deploy_fs = self.deploy_filesystem()?;
        let artifacts_fs: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new(config.artifacts_dir()));
        let changelog = self.changelog_service()?;
        let update_api = UpdateApiClient::new(&config.update_api_host)?;

        Ok(ReleasePrepareService::new(
            config,
            deploy_fs,
            artifacts_fs,
            changelog,
            update_api,
        ))
    }

    /// Release orchestration service
    pub fn release_service(&mut self) -> Result<ReleaseService> {
        let config = self.config()?;
        let prepare = self.release_prepare_service()?;
        let tagging = self.tagging_service()?;
        Ok(ReleaseService::new(config, prepare, tagging))
    }
}
