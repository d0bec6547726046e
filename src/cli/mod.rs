//! Command line interface for shopware_release.

mod args;
pub mod commands;
mod context;
mod output;

pub use args::{Args, Command, ReleaseOptions};
pub use commands::execute_command;
pub use context::ReleaseContext;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
