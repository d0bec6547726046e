//! Changelog command: print the Markdown changelog of a release.

use super::require_tag;
use crate::cli::{OutputManager, ReleaseContext};
use crate::error::Result;
use crate::services::render_markdown;

pub(super) async fn execute_changelog(ctx: &mut ReleaseContext, output: &OutputManager) -> Result<()> {
    let tag = require_tag(ctx.options())?;
    let version = ctx.parser().parse(&tag)?;
    let service = ctx.changelog_service()?;

    output.progress(&format!("Collecting changelog for {version}..."))?;
    let entries = service.get_changelog(&version.to_string()).await?;
    output.verbose(&format!("JQL: {}", service.jql(&version.to_string())))?;

    output.data(&render_markdown(&version.to_string(), &entries))?;
    Ok(())
}
