//! Command execution.
//!
//! Each subcommand builds what it needs from a [`ReleaseContext`] and reports
//! through the [`OutputManager`].

mod changelog;
mod config;
mod prepare;
mod release;
mod tag;

use crate::cli::{Args, Command, OutputManager, ReleaseContext, ReleaseOptions};
use crate::error::{CliError, Result};

use changelog::execute_changelog;
use config::execute_config;
use prepare::execute_prepare;
use release::execute_release;
use tag::execute_tag;

/// Execute the parsed command and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet);
    let mut ctx = ReleaseContext::from_process(args.command.options().clone());

    let result = match &args.command {
        Command::Changelog(_) => execute_changelog(&mut ctx, &output).await,
        Command::Tag(_) => execute_tag(&mut ctx, &output).await,
        Command::Prepare(_) => execute_prepare(&mut ctx, &output).await,
        Command::Release(_) => execute_release(&mut ctx, &output).await,
        Command::Config(_) => execute_config(&mut ctx, &output),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            output.error(&format!("Command '{}' failed: {}", args.command.name(), e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:")?;
                for suggestion in suggestions {
                    output.println(&format!("  • {}", suggestion))?;
                }
            }

            Ok(1)
        }
    }
}

/// Tag argument of commands that operate on a release
fn require_tag(options: &ReleaseOptions) -> Result<String> {
    options.tag.clone().ok_or_else(|| {
        CliError::MissingArgument {
            argument: "TAG".to_string(),
        }
        .into()
    })
}
