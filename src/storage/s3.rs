//! S3 bucket filesystem.

use super::{Filesystem, StorageLocation, normalize_key};
use crate::config::DeployTarget;
use crate::error::{Result, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use std::fmt;

/// Filesystem backed by one S3 bucket.
///
/// Uploaded objects are public-read so they are reachable under the public
/// domain. Credentials are not checked on construction; authentication
/// problems surface on the first request.
#[derive(Clone)]
pub struct S3Filesystem {
    client: Client,
    bucket: String,
    region: String,
    public_domain: String,
}

impl fmt::Debug for S3Filesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Filesystem")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("public_domain", &self.public_domain)
            .finish()
    }
}

impl S3Filesystem {
    /// Create a filesystem for the deploy target's bucket using its static credentials
    pub fn new(target: &DeployTarget) -> Self {
        let credentials = Credentials::new(
            target.access_key_id.clone(),
            target.secret_access_key.clone(),
            None,
            None,
            "release-config",
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(target.region.clone()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(config),
            bucket: target.bucket.clone(),
            region: target.region.clone(),
            public_domain: target.public_domain.clone(),
        }
    }

    /// Bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload request for `key`, readable by everyone
    fn put_request(&self, key: &str, contents: Bytes) -> PutObjectFluentBuilder {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type(key))
            .body(ByteStream::from(contents))
    }

    fn remote_error(&self, operation: &str, key: &str, reason: String) -> StorageError {
        StorageError::Remote {
            operation: operation.to_string(),
            bucket: self.bucket.clone(),
            key: key.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl Filesystem for S3Filesystem {
    fn location(&self) -> StorageLocation {
        StorageLocation::S3 {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            public_domain: self.public_domain.clone(),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_domain.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let key = normalize_key(path)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound { path: key.clone() }
                } else {
                    self.remote_error("get_object", &key, DisplayErrorContext(&e).to_string())
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| self.remote_error("get_object", &key, e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn write(&self, path: &str, contents: Bytes) -> Result<()> {
        let key = normalize_key(path)?;
        log::info!("Uploading {} bytes to s3://{}/{}", contents.len(), self.bucket, key);

        self.put_request(&key, contents)
            .send()
            .await
            .map_err(|e| self.remote_error("put_object", &key, DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn has(&self, path: &str) -> Result<bool> {
        let key = normalize_key(path)?;
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(self
                .remote_error("head_object", &key, DisplayErrorContext(&e).to_string())
                .into()),
        }
    }
}

fn content_type(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}
