//! Artifact harvesting into the package tree.
//!
//! Harvesting is a list of [`CopyRule`]s applied in order. Each rule copies
//! files whose name matches a glob from one source directory into one
//! package-relative destination. Rules whose source directory does not exist,
//! or that match nothing, are skipped silently: platform-specific artifacts
//! are expected to be absent on other platforms.
//!
//! Harvesting only ever adds or overwrites files under the package root.
//!
//! Package layout:
//! ```text
//! <bundle>/include/**     headers per bundle (src, include, generated)
//! third_party/**          vendored third-party headers
//! include/**              project-wide generated headers
//! lib/                    shared, static and import libraries (flat)
//! cmake/**                CMake functions and templates, unfiltered
//! <Name>Config.cmake, <Name>ConfigVersion.cmake, <Name>Targets.cmake
//! link_dependencies.txt
//! ```

use anyhow::{Context, Result};
use glob::Pattern;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::build::BuildTree;
use crate::config::Config;
use crate::deps::MANIFEST_FILE;
use crate::platform::BuildType;
use crate::source::SourceTree;

/// Header glob.
const HEADERS: &str = "*.h";

/// Library globs. The trailing `*` on `.so` keeps versioned sonames.
const LIBRARIES: &[&str] = &["*.so*", "*.dylib", "*.a", "*.lib"];

/// How matched files are placed under the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Recurse and keep the path relative to the source directory.
    Tree,
    /// Recurse and drop intermediate directories (e.g. `lib/Release/x.lib`).
    Flatten,
    /// Only direct children of the source directory.
    TopLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRule {
    pub src: PathBuf,
    /// Destination relative to the package root.
    pub dst: PathBuf,
    /// Glob matched against the file name.
    pub pattern: String,
    pub layout: Layout,
    /// When set, files under another build type's subdirectory
    /// (`lib/Debug/...` for a Release harvest) are skipped.
    pub build_type: Option<BuildType>,
}

impl CopyRule {
    pub fn new(src: PathBuf, dst: impl Into<PathBuf>, pattern: &str, layout: Layout) -> Self {
        Self {
            src,
            dst: dst.into(),
            pattern: pattern.to_string(),
            layout,
            build_type: None,
        }
    }

    pub fn for_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = Some(build_type);
        self
    }

    /// True if `relative` sits under a build-type directory other than ours.
    fn is_other_build_type(&self, relative: &Path) -> bool {
        let Some(wanted) = self.build_type else {
            return false;
        };
        let Some(parent) = relative.parent() else {
            return false;
        };
        parent.components().any(|c| {
            BuildType::ALL
                .iter()
                .any(|t| *t != wanted && c.as_os_str() == t.as_str())
        })
    }
}

/// The harvested package.
#[derive(Debug, Clone, Default)]
pub struct PackageTree {
    pub root: PathBuf,
    /// Package-relative paths written during this harvest.
    pub files: BTreeSet<PathBuf>,
}

/// Copy rules for one harvest, in application order.
pub fn harvest_rules(config: &Config, source: &SourceTree, build: &BuildTree) -> Vec<CopyRule> {
    let src = &source.path;
    let out = &build.path;
    let mut rules = Vec::new();

    // Public headers include private ones from src/, so those ship too.
    for bundle in &config.bundles {
        let include = Path::new(bundle).join("include");
        rules.push(CopyRule::new(src.join(bundle).join("src"), &include, HEADERS, Layout::Tree));
        rules.push(CopyRule::new(src.join(&include), &include, HEADERS, Layout::Tree));
        rules.push(CopyRule::new(out.join(&include), &include, HEADERS, Layout::Tree));
    }

    rules.push(CopyRule::new(src.join("third_party"), "third_party", HEADERS, Layout::Tree));
    rules.push(CopyRule::new(out.join("include"), "include", HEADERS, Layout::Tree));

    let libs = |src: PathBuf, pattern: &str| {
        CopyRule::new(src, "lib", pattern, Layout::Flatten).for_build_type(config.build_type)
    };
    for pattern in LIBRARIES {
        rules.push(libs(build.lib_dir(), *pattern));
    }
    // usWebConsole is emitted under bin/main rather than lib
    rules.push(libs(out.join("bin/main"), "*.so*"));
    rules.push(libs(out.join("bin/main"), "*.dylib"));
    rules.push(libs(out.join("bin"), "*.dll"));

    for suffix in ["Config.cmake", "ConfigVersion.cmake", "Targets.cmake"] {
        let file = format!("{}{}", config.name, suffix);
        rules.push(CopyRule::new(out.clone(), ".", &file, Layout::TopLevel));
    }

    // Everything, not just *.cmake: the directory also carries code templates.
    rules.push(CopyRule::new(src.join("cmake"), "cmake", "*", Layout::Tree));

    rules.push(CopyRule::new(out.clone(), ".", MANIFEST_FILE, Layout::TopLevel));

    rules
}

/// Apply one rule. Returns the package-relative paths written.
pub fn apply_rule(rule: &CopyRule, package_root: &Path) -> Result<Vec<PathBuf>> {
    if !rule.src.is_dir() {
        trace!(src = %rule.src.display(), "source directory absent, skipping");
        return Ok(Vec::new());
    }

    let pattern = Pattern::new(&rule.pattern)
        .with_context(|| format!("Invalid copy pattern '{}'", rule.pattern))?;

    let mut walker = WalkDir::new(&rule.src).min_depth(1);
    if rule.layout == Layout::TopLevel {
        walker = walker.max_depth(1);
    }

    let mut written = Vec::new();
    let mut seen = HashSet::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", rule.src.display()))?;
        // Follows symlinks, so soname links are copied as files and dangling
        // links are skipped.
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !pattern.matches(&name) {
            continue;
        }

        let in_src = entry
            .path()
            .strip_prefix(&rule.src)
            .with_context(|| format!("{} escaped {}", entry.path().display(), rule.src.display()))?;
        if rule.is_other_build_type(in_src) {
            trace!(path = %entry.path().display(), "other build type, skipping");
            continue;
        }

        let relative = match rule.layout {
            Layout::Tree => in_src.to_path_buf(),
            Layout::Flatten | Layout::TopLevel => PathBuf::from(entry.file_name()),
        };
        let package_path = normalize(&rule.dst.join(relative));
        let dest = package_root.join(&package_path);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(entry.path(), &dest).with_context(|| {
            format!("Failed to copy {} to {}", entry.path().display(), dest.display())
        })?;
        if seen.insert(package_path.clone()) {
            written.push(package_path);
        } else {
            debug!(
                path = %package_path.display(),
                from = %entry.path().display(),
                "name collision, overwrote earlier copy"
            );
        }
    }

    debug!(
        src = %rule.src.display(),
        pattern = %rule.pattern,
        copied = written.len(),
        "applied copy rule"
    );
    Ok(written)
}

/// Copy headers, libraries and CMake metadata into `config.package_dir()`.
pub fn harvest(config: &Config, source: &SourceTree, build: &BuildTree) -> Result<PackageTree> {
    let root = config.package_dir();
    fs::create_dir_all(&root).with_context(|| format!("Failed to create {}", root.display()))?;

    let mut tree = PackageTree {
        root: root.clone(),
        files: BTreeSet::new(),
    };

    for rule in harvest_rules(config, source, build) {
        tree.files.extend(apply_rule(&rule, &root)?);
    }

    println!("  Harvested {} files into {}", tree.files.len(), root.display());
    Ok(tree)
}

/// Drop `.` components so `./Foo.cmake` and `Foo.cmake` are the same entry.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
