//! Config command: print the resolved configuration with secrets masked.

use crate::cli::{OutputManager, ReleaseContext};
use crate::error::Result;

pub(super) fn execute_config(ctx: &mut ReleaseContext, output: &OutputManager) -> Result<()> {
    let config = ctx.config()?;

    output.data(&serde_json::to_string_pretty(&config.redacted())?)?;

    for name in config.missing_credentials() {
        output.warn(&format!("{name} is not set"))?;
    }

    Ok(())
}
