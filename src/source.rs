//! Upstream source acquisition via shallow git clone.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::process::{Cmd, CommandRunner};

/// A pinned checkout of the upstream repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    pub path: PathBuf,
    pub url: String,
    pub branch: String,
}

/// How the source tree was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// Cloned during this run.
    Cloned,
    /// Directory already existed; nothing was fetched.
    Existing,
}

/// Release branch for `version`: the prefix followed by the version.
pub fn branch_name(prefix: &str, version: &str) -> String {
    format!("{}{}", prefix, version)
}

/// Command that clones `branch` of `url` into `dest` at depth 1.
pub fn clone_cmd(git: &str, url: &str, branch: &str, dest: &Path) -> Cmd {
    Cmd::new(git)
        .arg("clone")
        .arg(url)
        .args(["--branch", branch, "--depth", "1"])
        .arg_path(dest)
        .error_msg(format!("git clone of branch '{}' failed", branch))
        .interactive()
}

/// Clone the upstream source unless the checkout directory already exists.
///
/// An existing directory is trusted as-is: no fetch, no integrity check.
/// Clone failures are fatal.
pub fn acquire(config: &Config, runner: &dyn CommandRunner) -> Result<(SourceTree, Acquired)> {
    let branch = branch_name(&config.branch_prefix, &config.version);
    let tree = SourceTree {
        path: config.source_dir(),
        url: config.git_url.clone(),
        branch,
    };

    if tree.path.exists() {
        println!("  [SKIP] Source tree exists at {}", tree.path.display());
        return Ok((tree, Acquired::Existing));
    }

    println!("  Cloning {} ({})...", tree.url, tree.branch);
    clone_cmd(&config.git, &tree.url, &tree.branch, &tree.path).run(runner)?;

    if !tree.path.is_dir() {
        bail!(
            "git clone reported success but {} does not exist",
            tree.path.display()
        );
    }

    Ok((tree, Acquired::Cloned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_substitutes_version_once() {
        assert_eq!(branch_name("beta-release-", "3.0.0"), "beta-release-3.0.0");
        assert_eq!(branch_name("beta-release-", "10.2.1-rc1"), "beta-release-10.2.1-rc1");
        let branch = branch_name("beta-release-", "3.0.0");
        assert_eq!(branch.matches("3.0.0").count(), 1);
    }

    #[test]
    fn clone_is_shallow_and_pinned() {
        let cmd = clone_cmd("git", "https://example.com/r.git", "beta-release-3.0.0", Path::new("/w/CppMicroServices"));
        assert_eq!(cmd.program(), "git");
        assert_eq!(
            cmd.get_args(),
            [
                "clone",
                "https://example.com/r.git",
                "--branch",
                "beta-release-3.0.0",
                "--depth",
                "1",
                "/w/CppMicroServices",
            ]
        );
    }
}
