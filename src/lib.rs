//! # Shopware Release
//!
//! Release automation for the Shopware platform.
//!
//! The crate turns the CI environment and command line options into a
//! [`ReleaseConfig`] and assembles the services that drive a release:
//!
//! - **Changelog**: issues fixed in a version, collected from Jira
//! - **Tagging**: release tags in GitLab and the split sub-repositories
//! - **Prepare**: archives uploaded to the deploy bucket and registered in the release index
//! - **Release**: tag a prepared release and make it public
//!
//! ## Usage
//!
//! ```bash
//! shopware_release changelog v6.5.0.0
//! shopware_release prepare v6.5.0.0 --deploy
//! shopware_release release v6.5.0.0 --deploy
//! shopware_release config
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod clients;
pub mod config;
pub mod env;
pub mod error;
pub mod services;
pub mod storage;
pub mod version;

pub use cli::{Args, ReleaseContext, ReleaseOptions};
pub use config::{JiraCredentials, ReleaseConfig, RepoDescriptor};
pub use env::EnvConfig;
pub use error::{ReleaseError, Result};
pub use services::{ChangelogService, ReleasePrepareService, ReleaseService, TaggingService};
pub use storage::{Filesystem, LocalFilesystem, S3Filesystem, StorageLocation};
pub use version::{ReleaseVersion, Stability, VersionParser};
