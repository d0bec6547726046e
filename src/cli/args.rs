//! Command line argument parsing.

use clap::{Parser, Subcommand};

/// Release automation for the Shopware platform
#[derive(Parser, Debug)]
#[command(
    name = "shopware_release",
    version,
    about = "Release automation for the Shopware platform",
    long_about = "Generate changelogs, create tags and publish release artifacts.

Configuration is read from the environment (CI_PROJECT_ID, CI_API_V4_URL,
BOT_API_TOKEN, TARGET_BRANCH, PROJECT_ROOT, AWS_ACCESS_KEY_ID, ...).

Usage:
  shopware_release changelog v6.5.0.0
  shopware_release prepare v6.5.0.0 --deploy
  shopware_release release v6.5.0.0 --deploy"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Show additional progress output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print command results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Release tag, e.g. v6.5.0.0 or v6.5.0.0-rc1
    #[arg(value_name = "TAG")]
    pub tag: Option<String>,

    /// Stability of the release (stable, rc, beta, alpha, dev)
    #[arg(long)]
    pub stability: Option<String>,

    /// Minimum stability, used when --stability is absent
    #[arg(long = "minimum-stability")]
    pub minimum_stability: Option<String>,

    /// Publish to the S3 deploy bucket instead of the local deploy directory
    #[arg(long)]
    pub deploy: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the changelog for a release
    Changelog(ReleaseOptions),
    /// Create the release tag in GitLab and the sub-repositories
    Tag(ReleaseOptions),
    /// Upload artifacts and register a release without publishing it
    Prepare(ReleaseOptions),
    /// Tag and publish a prepared release
    Release(ReleaseOptions),
    /// Print the resolved configuration with secrets masked
    Config(ReleaseOptions),
}

impl Command {
    /// Subcommand name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Changelog(_) => "changelog",
            Command::Tag(_) => "tag",
            Command::Prepare(_) => "prepare",
            Command::Release(_) => "release",
            Command::Config(_) => "config",
        }
    }

    /// Options of the subcommand
    pub fn options(&self) -> &ReleaseOptions {
        match self {
            Command::Changelog(options)
            | Command::Tag(options)
            | Command::Prepare(options)
            | Command::Release(options)
            | Command::Config(options) => options,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_with_options() {
        let args = Args::try_parse_from([
            "shopware_release",
            "release",
            "v6.5.0.0-rc1",
            "--stability",
            "rc",
            "--deploy",
        ])
        .unwrap();

        assert_eq!(args.command.name(), "release");
        let options = args.command.options();
        assert_eq!(options.tag.as_deref(), Some("v6.5.0.0-rc1"));
        assert_eq!(options.stability.as_deref(), Some("rc"));
        assert!(options.deploy);
        assert_eq!(options.minimum_stability, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["shopware_release", "changelog", "v6.5.0.0", "-v"]).unwrap();
        assert!(args.verbose);
        assert!(!args.quiet);

        let conflict =
            Args::try_parse_from(["shopware_release", "tag", "v6.5.0.0", "--verbose", "--quiet"]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_tag_is_optional() {
        let args = Args::try_parse_from(["shopware_release", "config", "--minimum-stability", "beta"])
            .unwrap();
        let options = args.command.options();
        assert_eq!(options.tag, None);
        assert_eq!(options.minimum_stability.as_deref(), Some("beta"));
        assert!(!options.deploy);
    }
}
