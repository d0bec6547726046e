//! Prepare command: upload artifacts and register the release.

use super::require_tag;
use crate::cli::{OutputManager, ReleaseContext};
use crate::error::Result;

pub(super) async fn execute_prepare(ctx: &mut ReleaseContext, output: &OutputManager) -> Result<()> {
    let tag = require_tag(ctx.options())?;
    let service = ctx.release_prepare_service()?;

    output.progress(&format!(
        "Preparing {tag} on {}...",
        service.deploy_fs().location()
    ))?;
    let entry = service.prepare_release(&tag).await?;

    output.success(&format!(
        "Prepared {} ({}) with {} changelog entries",
        entry.version,
        entry.stability,
        entry.changelog.len()
    ))?;
    for artifact in entry.install.iter().chain(entry.update.iter()) {
        output.indent(&format!("{} ({} bytes, sha256 {})", artifact.uri, artifact.size, artifact.sha256))?;
    }

    Ok(())
}
