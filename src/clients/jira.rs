//! Jira REST v2 client (basic auth).

use super::{endpoint, ensure_success};
use crate::config::JiraCredentials;
use crate::error::{ApiError, ConfigError, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

/// One page of a Jira issue search
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Offset of the first issue
    #[serde(default)]
    pub start_at: u32,
    /// Page size requested
    #[serde(default)]
    pub max_results: u32,
    /// Total matching issues
    #[serde(default)]
    pub total: u32,
    /// Issues in this page
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

/// Jira issue with the fields the changelog needs
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    /// Issue key, e.g. NEXT-1234
    pub key: String,
    /// Selected fields
    pub fields: JiraIssueFields,
}

/// Issue fields
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueFields {
    /// Issue title
    #[serde(default)]
    pub summary: String,
    /// Issue type
    #[serde(default)]
    pub issuetype: Option<JiraIssueType>,
}

/// Issue type
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueType {
    /// Type name, e.g. Bug or Story
    pub name: String,
}

/// Jira API client
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: Client,
    base_uri: String,
    user: String,
    password: String,
}

impl JiraClient {
    /// Create a client from resolved credentials
    pub fn new(credentials: &JiraCredentials) -> Result<Self> {
        if credentials.api_user.is_empty() || credentials.api_password.is_empty() {
            log::warn!("Jira credentials are empty; requests will likely be rejected");
        }

        let http = Client::builder()
            .user_agent(concat!("shopware_release/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::ClientBuild {
                client: "Jira".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_uri: credentials.api_base_uri.clone(),
            user: credentials.api_user.clone(),
            password: credentials.api_password.clone(),
        })
    }

    /// Configured base URI
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Start an authenticated request to `segments` below the base URI
    pub fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = endpoint(&self.base_uri, "JIRA_API_V2_URL", segments)?;
        Ok(self
            .http
            .request(method, url)
            .basic_auth(&self.user, Some(&self.password)))
    }

    /// Run a JQL search and return one page
    pub async fn search(&self, jql: &str, start_at: u32, max_results: u32) -> Result<SearchPage> {
        log::debug!("Jira search (startAt={start_at}): {jql}");

        let response = self
            .request(Method::GET, &["search"])?
            .query(&[
                ("jql", jql.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", max_results.to_string()),
                ("fields", "summary,issuetype".to_string()),
            ])
            .send()
            .await?;

        let response = ensure_success("Jira", &Method::GET, response).await?;
        response.json::<SearchPage>().await.map_err(|e| {
            ApiError::UnexpectedResponse {
                service: "Jira".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
