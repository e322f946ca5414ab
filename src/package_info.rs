//! What a consumer links against and which include paths it needs.
//!
//! The declaration is static: it depends only on the configuration and the
//! target platform, never on what the dependency extractor found.

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::options::BuildConfiguration;
use crate::platform::{BuildType, Os};

/// Written to the package root by `uspack package`.
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// Subdirectories of `core/include` that public headers include without a
/// prefix. They come from the private `core/src` tree.
pub const CORE_PRIVATE_INCLUDE_DIRS: &[&str] = &["bundle", "service", "util"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub platform: Os,
    pub build_type: BuildType,
    pub arch: String,
    pub compiler: String,
    pub package_id: String,
    /// Libraries built by this package.
    pub libs: Vec<String>,
    /// Platform libraries consumers must link as well.
    pub system_libs: Vec<String>,
    /// Package-relative include directories.
    pub include_dirs: Vec<PathBuf>,
    /// Package-relative library directories.
    pub lib_dirs: Vec<PathBuf>,
}

impl PackageInfo {
    pub fn declare(config: &Config, options: &BuildConfiguration) -> Self {
        let mut include_dirs = vec![PathBuf::from("include")];
        include_dirs.extend(
            config
                .bundles
                .iter()
                .map(|bundle| Path::new(bundle).join("include")),
        );
        include_dirs.extend(
            CORE_PRIVATE_INCLUDE_DIRS
                .iter()
                .map(|sub| Path::new("core/include").join(sub)),
        );

        let system_libs = if config.platform.is_linux_family() {
            vec!["dl".to_string()]
        } else {
            Vec::new()
        };

        Self {
            name: config.name.clone(),
            version: config.version.clone(),
            platform: config.platform,
            build_type: config.build_type,
            arch: config.arch.clone(),
            compiler: config.compiler().to_string(),
            package_id: package_id(config, options),
            libs: vec![config.name.clone()],
            system_libs,
            include_dirs,
            lib_dirs: vec![PathBuf::from("lib")],
        }
    }

    /// Everything to link, package libraries first.
    pub fn link_libs(&self) -> Vec<String> {
        self.libs.iter().chain(&self.system_libs).cloned().collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize package info")
    }

    /// Write [`PACKAGE_INFO_FILE`] into `package_root`.
    pub fn write(&self, package_root: &Path) -> Result<PathBuf> {
        let path = package_root.join(PACKAGE_INFO_FILE);
        fs::create_dir_all(package_root)
            .with_context(|| format!("Failed to create {}", package_root.display()))?;
        fs::write(&path, self.to_json()? + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn print(&self) {
        println!("Package: {}/{} ({})", self.name, self.version, self.platform);
        println!(
            "  settings:     {} {} {}",
            self.build_type, self.arch, self.compiler
        );
        println!("  id:           {}", self.package_id);
        println!("  libs:         {}", self.link_libs().join(" "));
        println!("  lib dirs:     {}", join_paths(&self.lib_dirs));
        println!("  include dirs:");
        for dir in &self.include_dirs {
            println!("    {}", dir.display());
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 over name, version, build settings and sorted defines.
pub fn package_id(config: &Config, options: &BuildConfiguration) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config.name.as_bytes());
    hasher.update(b"/");
    hasher.update(config.version.as_bytes());
    for setting in [
        config.platform.as_str(),
        config.compiler(),
        config.build_type.as_str(),
        config.arch.as_str(),
    ] {
        hasher.update(b"\n");
        hasher.update(setting.as_bytes());
    }
    for define in options.defines() {
        hasher.update(b"\n");
        hasher.update(define.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
