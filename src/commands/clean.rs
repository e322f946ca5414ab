//! Clean command - removes source, build and package trees.

use anyhow::Result;

use uspack::clean::{self, CleanTarget};
use uspack::config::Config;

/// Execute the clean command.
pub fn cmd_clean(config: &Config, target: CleanTarget) -> Result<()> {
    clean::clean(config, target)?;
    Ok(())
}
