//! The packaging pipeline: source → build → dependencies → harvest → info.
//!
//! Every phase runs to completion before the next starts. Acquisition and
//! build failures abort the run; dependency extraction never does.

use anyhow::{bail, Result};

use crate::build::{self, BuildTree};
use crate::config::Config;
use crate::deps::{self, Extraction};
use crate::harvest::{self, PackageTree};
use crate::options::BuildConfiguration;
use crate::package_info::PackageInfo;
use crate::process::CommandRunner;
use crate::source::{self, SourceTree};
use crate::timing::Timer;

/// Everything a full run produced.
#[derive(Debug)]
pub struct PackageReport {
    pub source: SourceTree,
    pub build: BuildTree,
    pub dependencies: Extraction,
    pub package: PackageTree,
    pub info: PackageInfo,
}

/// Shared context for all phases.
pub struct Pipeline<'a> {
    pub config: &'a Config,
    pub options: BuildConfiguration,
    runner: &'a dyn CommandRunner,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, options: BuildConfiguration, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            options,
            runner,
        }
    }

    /// Clone the upstream source unless it is already present.
    pub fn source(&self) -> Result<SourceTree> {
        let t = Timer::start("Source");
        let (tree, _) = source::acquire(self.config, self.runner)?;
        t.finish();
        Ok(tree)
    }

    /// Configure and build, acquiring the source first if needed.
    pub fn build(&self) -> Result<(SourceTree, BuildTree)> {
        let t = Timer::start("Build");
        let trees = build::build(self.config, &self.options, self.runner)?;
        t.finish();
        Ok(trees)
    }

    /// Best-effort link-dependency discovery against an existing build tree.
    pub fn dependencies(&self) -> Result<Extraction> {
        let t = Timer::start("Dependencies");
        let build = BuildTree::open(&self.config.build_dir())?;
        let extraction =
            deps::extract_dependencies(&self.config.cmake, &build, &self.config.name, self.runner)?;
        t.finish();
        Ok(extraction)
    }

    /// Harvest existing source and build trees and write the package info file.
    pub fn package(&self) -> Result<(PackageTree, PackageInfo)> {
        let source = self.existing_source()?;
        let build = BuildTree::open(&self.config.build_dir())?;
        self.package_from(&source, &build)
    }

    fn package_from(&self, source: &SourceTree, build: &BuildTree) -> Result<(PackageTree, PackageInfo)> {
        let t = Timer::start("Package");
        let mut package = harvest::harvest(self.config, source, build)?;
        let info = self.info();
        let written = info.write(&package.root)?;
        if let Ok(relative) = written.strip_prefix(&package.root) {
            package.files.insert(relative.to_path_buf());
        }
        t.finish();
        Ok((package, info))
    }

    /// The package info declaration for this configuration.
    pub fn info(&self) -> PackageInfo {
        PackageInfo::declare(self.config, &self.options)
    }

    /// Run every phase in order.
    pub fn create(&self) -> Result<PackageReport> {
        println!("=== Packaging {}/{} ===\n", self.config.name, self.config.version);

        let (source, build) = self.build()?;
        let dependencies = self.dependencies()?;
        let (package, info) = self.package_from(&source, &build)?;

        println!("\nPackage ready at {}", package.root.display());
        Ok(PackageReport {
            source,
            build,
            dependencies,
            package,
            info,
        })
    }

    fn existing_source(&self) -> Result<SourceTree> {
        let path = self.config.source_dir();
        if !path.is_dir() {
            bail!(
                "Source tree not found at {}. Run 'uspack source' first.",
                path.display()
            );
        }
        Ok(SourceTree {
            path,
            url: self.config.git_url.clone(),
            branch: source::branch_name(&self.config.branch_prefix, &self.config.version),
        })
    }
}
