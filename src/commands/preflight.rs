//! Preflight command - runs preflight checks.

use anyhow::Result;

use uspack::config::Config;
use uspack::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(config: &Config, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(config)?;
        println!("All preflight checks passed!");
    } else {
        let report = preflight::run_preflight(config);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail instead.");
        }
    }
    Ok(())
}
