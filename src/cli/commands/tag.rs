//! Tag command: create the release tag in GitLab and the sub-repositories.

use super::require_tag;
use crate::cli::{OutputManager, ReleaseContext};
use crate::error::Result;

pub(super) async fn execute_tag(ctx: &mut ReleaseContext, output: &OutputManager) -> Result<()> {
    let tag = require_tag(ctx.options())?;
    let tagging = ctx.tagging_service()?;

    output.progress(&format!("Creating tag {tag}..."))?;
    let created = tagging.create_release_tag(&tag).await?;
    output.success(&format!("Created {} at {}", created.name, created.target))?;

    for repo in tagging.repository_plan(&tag) {
        output.verbose(&format!("{} -> {}", repo.path.display(), repo.remote_url))?;
    }

    let tagged = tagging.tag_repositories(&tag).await?;
    if tagged.is_empty() {
        output.warn("No sub-repository checkouts found, nothing pushed")?;
    } else {
        output.success(&format!("Tagged sub-repositories: {}", tagged.join(", ")))?;
    }

    Ok(())
}
