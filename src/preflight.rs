//! Preflight checks: are the external tools the pipeline drives available?

use anyhow::{bail, Result};

use crate::config::Config;
use crate::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - the pipeline will fail.
    Fail,
}

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn fail_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count()
    }

    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");
        for check in &self.checks {
            let (icon, status) = match check.status {
                CheckStatus::Pass => ("✓", "PASS"),
                CheckStatus::Fail => ("✗", "FAIL"),
            };
            println!("  {} [{}] {}: {}", icon, status, check.name, check.details);
        }
        println!();
        println!(
            "Summary: {}/{} passed",
            self.checks.len() - self.fail_count(),
            self.checks.len()
        );
    }
}

/// Look up `program` on PATH (or as a path) and describe what it is for.
fn check_tool(program: &str, purpose: &str) -> CheckResult {
    match process::which(program) {
        Some(path) => CheckResult {
            name: program.to_string(),
            status: CheckStatus::Pass,
            details: path.display().to_string(),
        },
        None => CheckResult {
            name: program.to_string(),
            status: CheckStatus::Fail,
            details: format!("Not found. {}", purpose),
        },
    }
}

/// Check every tool the configuration names.
pub fn run_preflight(config: &Config) -> PreflightReport {
    PreflightReport {
        checks: vec![
            check_tool(&config.git, "Required to clone the upstream source"),
            check_tool(&config.cmake, "Required to configure, build and export the dependency graph"),
        ],
    }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before packaging.",
            report.fail_count()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_tool_passes() {
        let check = check_tool("sh", "shell");
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn missing_tool_fails_with_purpose() {
        let check = check_tool("nonexistent_program_12345", "Needed for testing");
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.details.contains("Needed for testing"));

        let report = PreflightReport {
            checks: vec![check],
        };
        assert!(!report.all_passed());
        assert_eq!(report.fail_count(), 1);
    }
}
