//! GitLab REST v4 client (`PRIVATE-TOKEN` header).

use super::{endpoint, ensure_success};
use crate::error::{ApiError, ConfigError, Result};
use reqwest::header::HeaderValue;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

/// Tag as returned by the GitLab tags API
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GitLabTag {
    /// Tag name
    pub name: String,
    /// Annotation message
    #[serde(default)]
    pub message: Option<String>,
    /// Target commit SHA
    #[serde(default)]
    pub target: String,
}

/// GitLab API client
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_uri: String,
    token: HeaderValue,
}

impl GitLabClient {
    /// Create a client sending `token` on every request
    pub fn new(base_uri: &str, token: &str) -> Result<Self> {
        if token.is_empty() {
            log::warn!("BOT_API_TOKEN is empty; GitLab requests will likely be rejected");
        }

        let mut token = HeaderValue::from_str(token).map_err(|e| ConfigError::ClientBuild {
            client: "GitLab".to_string(),
            reason: format!("invalid token: {e}"),
        })?;
        token.set_sensitive(true);

        let http = Client::builder()
            .user_agent(concat!("shopware_release/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::ClientBuild {
                client: "GitLab".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_uri: base_uri.to_string(),
            token,
        })
    }

    /// Configured base URI
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Start a request to `segments` below the base URI
    pub fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = endpoint(&self.base_uri, "CI_API_V4_URL", segments)?;
        Ok(self
            .http
            .request(method, url)
            .header("PRIVATE-TOKEN", self.token.clone()))
    }

    /// Look up a tag; `None` when it does not exist
    pub async fn get_tag(&self, project_id: &str, tag: &str) -> Result<Option<GitLabTag>> {
        let response = self
            .request(Method::GET, &["projects", project_id, "repository", "tags", tag])?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success("GitLab", &Method::GET, response).await?;
        Ok(Some(decode(response).await?))
    }

    /// Create an annotated tag on `git_ref`
    pub async fn create_tag(
        &self,
        project_id: &str,
        tag: &str,
        git_ref: &str,
        message: &str,
    ) -> Result<GitLabTag> {
        log::info!("Creating GitLab tag {tag} on {git_ref} in project {project_id}");

        let response = self
            .request(Method::POST, &["projects", project_id, "repository", "tags"])?
            .json(&serde_json::json!({
                "tag_name": tag,
                "ref": git_ref,
                "message": message,
            }))
            .send()
            .await?;

        let response = ensure_success("GitLab", &Method::POST, response).await?;
        decode(response).await
    }

    /// Delete a tag
    pub async fn delete_tag(&self, project_id: &str, tag: &str) -> Result<()> {
        log::info!("Deleting GitLab tag {tag} in project {project_id}");

        let response = self
            .request(Method::DELETE, &["projects", project_id, "repository", "tags", tag])?
            .send()
            .await?;

        ensure_success("GitLab", &Method::DELETE, response).await?;
        Ok(())
    }
}

async fn decode(response: reqwest::Response) -> Result<GitLabTag> {
    response.json::<GitLabTag>().await.map_err(|e| {
        ApiError::UnexpectedResponse {
            service: "GitLab".to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
