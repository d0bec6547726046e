//! Release services assembled from configuration and clients.

mod changelog;
mod index;
mod prepare;
mod release;
mod tagging;

pub use changelog::{ChangelogEntry, ChangelogService, render_markdown, sort_entries};
pub use index::{RELEASE_INDEX, ReleaseArtifact, ReleaseEntry, ReleaseIndex};
pub use prepare::ReleasePrepareService;
pub use release::{ReleaseService, ReleaseSummary};
pub use tagging::{RepoTag, TaggingService};
