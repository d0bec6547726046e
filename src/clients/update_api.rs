//! Client for the update API that announces releases to running shops.

use super::{endpoint, ensure_success};
use crate::error::{ConfigError, Result};
use reqwest::{Client, Method};
use serde::Serialize;

/// Update API client keyed by host
#[derive(Debug, Clone)]
pub struct UpdateApiClient {
    http: Client,
    host: String,
}

impl UpdateApiClient {
    /// Create a client for `host`; a host without scheme is reached over https
    pub fn new(host: &str) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        let host = if host.is_empty() || host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };

        let http = Client::builder()
            .user_agent(concat!("shopware_release/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::ClientBuild {
                client: "update API".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { http, host })
    }

    /// Base URL including scheme
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether a host is configured
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }

    /// Register release data (not yet public)
    pub async fn insert_release_data<T: Serialize + ?Sized>(&self, release: &T) -> Result<()> {
        self.post(&["v1", "release", "insert"], release).await
    }

    /// Mark a release as public
    pub async fn publish_release(&self, version: &str) -> Result<()> {
        self.post(
            &["v1", "release", "publish"],
            &serde_json::json!({ "version": version }),
        )
        .await
    }

    async fn post<T: Serialize + ?Sized>(&self, segments: &[&str], body: &T) -> Result<()> {
        let url = endpoint(&self.host, "UPDATE_API_HOST", segments)?;
        log::info!("Notifying update API: POST {url}");

        let response = self.http.post(url).json(body).send().await?;
        ensure_success("update API", &Method::POST, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ReleaseError};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_host_without_scheme_gets_https() {
        let client = UpdateApiClient::new("update-api.shopware.com/").unwrap();
        assert_eq!(client.host(), "https://update-api.shopware.com");
        assert!(client.is_configured());
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let client = UpdateApiClient::new("http://localhost:8080").unwrap();
        assert_eq!(client.host(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_unconfigured_host_fails_on_use() {
        let client = UpdateApiClient::new("").unwrap();
        assert!(!client.is_configured());
        assert!(client.publish_release("6.5.0.0").await.is_err());
    }

    #[tokio::test]
    async fn test_insert_and_publish_paths_and_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/release/insert"))
            .and(body_json(json!({"version": "6.5.0.0", "public": false})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/release/publish"))
            .and(body_json(json!({"version": "6.5.0.0"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpdateApiClient::new(&server.uri()).unwrap();
        client
            .insert_release_data(&json!({"version": "6.5.0.0", "public": false}))
            .await
            .unwrap();
        client.publish_release("6.5.0.0").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = UpdateApiClient::new(&server.uri()).unwrap();
        let err = client.publish_release("6.5.0.0").await.unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Api(ApiError::Status { status: 500, ref body, .. }) if body == "boom"
        ));
    }
}
