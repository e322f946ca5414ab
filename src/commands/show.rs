//! Show command - displays information.

use anyhow::Result;

use uspack::config::Config;
use uspack::options::{BuildConfiguration, OPTIONS};

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show build options with defaults and chosen values
    Options,
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config, options: &BuildConfiguration) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Options => {
            println!("Build options:");
            for option in OPTIONS {
                let chosen = options.get(option.name).unwrap_or(option.default);
                let marker = if chosen == option.default { " " } else { "*" };
                println!(
                    "  {}{:<32} {:<3} (default {:<3}) {}",
                    marker, option.name, chosen, option.default, option.description
                );
            }
        }
    }
    Ok(())
}
