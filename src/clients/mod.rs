//! HTTP clients for the external systems a release talks to.
//!
//! Base URIs are validated when a request is built, not on construction, so a
//! command that never calls a service does not fail on its missing settings.

mod gitlab;
mod jira;
mod update_api;

pub use gitlab::{GitLabClient, GitLabTag};
pub use jira::{JiraClient, JiraIssue, JiraIssueFields, JiraIssueType, SearchPage};
pub use update_api::UpdateApiClient;

use crate::error::{ApiError, ConfigError, Result};
use reqwest::{Method, Response, StatusCode};
use url::Url;

const MAX_ERROR_BODY: usize = 500;

/// Build an endpoint URL by appending percent-encoded path segments to a base URI
pub(crate) fn endpoint(base: &str, env_var: &str, segments: &[&str]) -> Result<Url> {
    if base.trim().is_empty() {
        return Err(ConfigError::MissingValue {
            name: env_var.to_ascii_lowercase(),
            env_var: env_var.to_string(),
        }
        .into());
    }

    let mut url = Url::parse(base.trim()).map_err(|e| ConfigError::InvalidUrl {
        name: env_var.to_string(),
        value: base.to_string(),
        reason: e.to_string(),
    })?;

    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl {
            name: env_var.to_string(),
            value: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Turn non-success responses into errors
pub(crate) async fn ensure_success(
    service: &str,
    method: &Method,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            service: service.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let url = response.url().to_string();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }

    Err(ApiError::Status {
        service: service.to_string(),
        method: method.to_string(),
        url,
        status: status.as_u16(),
        body,
    }
    .into())
}
