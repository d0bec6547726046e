//! Error types for release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version parsing and comparison errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Deploy or artifact storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote API errors (Jira, GitLab, update API)
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Release workflow errors
    #[error("Release error: {0}")]
    Workflow(#[from] WorkflowError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Stability name that is none of stable, rc, beta, alpha, dev
    #[error("Invalid stability '{value}' from {source_name}. Expected one of: stable, rc, beta, alpha, dev")]
    InvalidStability {
        /// Offending value
        value: String,
        /// Where the value came from (option or environment variable)
        source_name: String,
    },

    /// A base URI could not be parsed
    #[error("Invalid URL for {name}: '{value}' ({reason})")]
    InvalidUrl {
        /// Configuration key
        name: String,
        /// Offending value
        value: String,
        /// Parser message
        reason: String,
    },

    /// A value required by the current operation is empty
    #[error("Missing configuration value {name}. Set the {env_var} environment variable.")]
    MissingValue {
        /// Configuration key
        name: String,
        /// Environment variable that provides it
        env_var: String,
    },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client for {client}: {reason}")]
    ClientBuild {
        /// Client name
        client: String,
        /// Reason for the error
        reason: String,
    },
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Version below the configured minimum
    #[error("Version {version} is lower than the minimum supported version {minimum}")]
    BelowMinimum {
        /// Requested version
        version: String,
        /// Configured minimum version
        minimum: String,
    },
}

/// Storage errors for local and S3 filesystems
#[derive(Error, Debug)]
pub enum StorageError {
    /// File does not exist
    #[error("File not found: {path}")]
    NotFound {
        /// Path inside the filesystem
        path: String,
    },

    /// Path escapes the filesystem root
    #[error("Invalid storage path '{path}'")]
    InvalidPath {
        /// Offending path
        path: String,
    },

    /// Local filesystem operation failed
    #[error("Local filesystem {operation} failed for {path}: {source}")]
    Local {
        /// Operation that failed
        operation: String,
        /// Absolute path on disk
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// S3 operation failed
    #[error("S3 {operation} failed for s3://{bucket}/{key}: {reason}")]
    Remote {
        /// Operation that failed
        operation: String,
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
        /// Reason for the error
        reason: String,
    },
}

/// Remote API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-success HTTP status
    #[error("{service} request {method} {url} failed with status {status}: {body}")]
    Status {
        /// Service name
        service: String,
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Authentication rejected
    #[error("{service} rejected the credentials (status {status})")]
    Unauthorized {
        /// Service name
        service: String,
        /// HTTP status code
        status: u16,
    },

    /// Response could not be decoded
    #[error("Unexpected {service} response: {reason}")]
    UnexpectedResponse {
        /// Service name
        service: String,
        /// Reason for the error
        reason: String,
    },
}

/// Release workflow errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Release already published
    #[error("Release {version} is already public")]
    AlreadyReleased {
        /// Version string
        version: String,
    },

    /// Release must be prepared before it can be released
    #[error("Release {version} has not been prepared")]
    NotPrepared {
        /// Version string
        version: String,
    },

    /// Tag already exists in GitLab
    #[error("Tag '{tag}' already exists")]
    TagExists {
        /// Tag name
        tag: String,
    },

    /// A git command failed in a sub-repository
    #[error("git {command} failed in {repo}: {reason}")]
    Git {
        /// Sub-repository name
        repo: String,
        /// Git command
        command: String,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Interactive prompt failed
    #[error("Prompt failed: {reason}")]
    Prompt {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::MissingValue { env_var, .. }) => vec![
                format!("Export {env_var} before running the command"),
                "Run 'shopware_release config' to inspect the resolved configuration".to_string(),
            ],
            ReleaseError::Config(ConfigError::InvalidStability { .. }) => vec![
                "Use one of: stable, rc, beta, alpha, dev".to_string(),
                "Unset STABILITY to derive the stability from the tag".to_string(),
            ],
            ReleaseError::Api(ApiError::Unauthorized { service, .. }) => match service.as_str() {
                "Jira" => vec![
                    "Check JIRA_API_USER and JIRA_API_PASSWORD".to_string(),
                    "Unset them to be prompted interactively".to_string(),
                ],
                "GitLab" => vec![
                    "Check BOT_API_TOKEN has api scope for the project".to_string(),
                ],
                _ => vec!["Check the credentials for the update API host".to_string()],
            },
            ReleaseError::Storage(StorageError::Remote { .. }) => vec![
                "Check AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY".to_string(),
                "Run without --deploy to write to the local deploy directory".to_string(),
            ],
            ReleaseError::Workflow(WorkflowError::NotPrepared { version }) => vec![
                format!("Run 'shopware_release prepare {version}' first"),
            ],
            ReleaseError::Cli(CliError::MissingArgument { argument }) => vec![
                format!("Pass the release {argument}, e.g. 'shopware_release prepare v6.5.0.0'"),
            ],
            ReleaseError::Version(VersionError::BelowMinimum { .. }) => vec![
                "Check MINIMUM_VERSION for this branch".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Version(VersionError::InvalidVersion { .. })
                | ReleaseError::Version(VersionError::BelowMinimum { .. })
                | ReleaseError::Workflow(WorkflowError::AlreadyReleased { .. })
                | ReleaseError::Workflow(WorkflowError::TagExists { .. })
        )
    }
}
