//! Removal of source, build and package trees.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanTarget {
    /// Build and package trees (default)
    Outputs,
    Build,
    Package,
    Source,
    All,
}

fn remove_tree(label: &str, path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    println!("Removing {} ({})...", label, path.display());
    fs::remove_dir_all(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(true)
}

/// Remove the trees `target` names. Returns whether anything was removed.
pub fn clean(config: &Config, target: CleanTarget) -> Result<bool> {
    let (build, package, source) = match target {
        CleanTarget::Outputs => (true, true, false),
        CleanTarget::Build => (true, false, false),
        CleanTarget::Package => (false, true, false),
        CleanTarget::Source => (false, false, true),
        CleanTarget::All => (true, true, true),
    };

    let mut cleaned = false;
    if build {
        cleaned |= remove_tree("build tree", &config.build_dir())?;
    }
    if package {
        cleaned |= remove_tree("package tree", &config.package_dir())?;
    }
    if source {
        cleaned |= remove_tree("source tree", &config.source_dir())?;
    }

    if cleaned {
        println!("Clean complete.");
    } else {
        println!("Nothing to clean.");
    }
    Ok(cleaned)
}
