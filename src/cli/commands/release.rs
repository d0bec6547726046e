//! Release command: tag and publish a prepared release.

use super::require_tag;
use crate::cli::{OutputManager, ReleaseContext};
use crate::error::Result;

pub(super) async fn execute_release(ctx: &mut ReleaseContext, output: &OutputManager) -> Result<()> {
    let tag = require_tag(ctx.options())?;
    let service = ctx.release_service()?;

    output.section(&format!("Release {tag}"))?;
    let summary = service.release_tag(&tag).await?;

    output.success(&format!("Released {} as {}", summary.version, summary.tag))?;
    output.indent(&format!("Commit: {}", summary.commit))?;
    if !summary.repositories.is_empty() {
        output.indent(&format!("Sub-repositories: {}", summary.repositories.join(", ")))?;
    }
    if let Some(uri) = &summary.install_uri {
        output.indent(&format!("Install archive: {uri}"))?;
    }

    Ok(())
}
