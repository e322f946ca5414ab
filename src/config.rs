//! Configuration management for uspack.
//!
//! Reads configuration from a `.env` file in the work directory and from
//! environment variables. Environment variables take precedence over `.env`.
//! The resulting [`Config`] is built once at startup and passed by reference
//! to every phase.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::platform::{BuildType, Os};

/// Name of the packaged library. Also the source directory name and the
/// primary link target.
pub const PACKAGE_NAME: &str = "CppMicroServices";

/// Default upstream version.
pub const DEFAULT_VERSION: &str = "3.0.0";

/// Default upstream repository.
pub const DEFAULT_GIT_URL: &str = "https://github.com/CppMicroServices/CppMicroServices.git";

/// Upstream release branches are named `<prefix><version>`.
pub const DEFAULT_BRANCH_PREFIX: &str = "beta-release-";

/// Bundles of the library suite, each with its own include tree.
pub const BUNDLES: &[&str] = &["core", "httpservice", "shellservice", "webconsole"];

/// Uspack configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Package name (default: CppMicroServices)
    pub name: String,
    /// Upstream version to package
    pub version: String,
    /// Upstream git URL
    pub git_url: String,
    /// Branch name prefix joined with the version
    pub branch_prefix: String,
    /// git executable
    pub git: String,
    /// cmake executable
    pub cmake: String,
    /// Platform the package is produced for
    pub platform: Os,
    /// CMake build type
    pub build_type: BuildType,
    /// Target architecture (default: host architecture)
    pub arch: String,
    /// Toolchain name; `None` means the platform default
    pub compiler: Option<String>,
    /// Directory holding source, build and package trees
    pub work_dir: PathBuf,
    /// Bundles to harvest headers for
    pub bundles: Vec<String>,
}

impl Config {
    /// Load configuration from `<work_dir>/.env` and the environment.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let mut env_vars = HashMap::new();

        let env_path = work_dir.join(".env");
        if env_path.exists() {
            let entries = dotenvy::from_path_iter(&env_path)
                .with_context(|| format!("Failed to read {}", env_path.display()))?;
            for entry in entries {
                let (key, value) =
                    entry.with_context(|| format!("Malformed line in {}", env_path.display()))?;
                env_vars.insert(key, value);
            }
        }

        // Environment variables override .env file. Entries that are not
        // valid UTF-8 cannot be ours and are skipped.
        for (key, value) in std::env::vars_os() {
            if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
                env_vars.insert(key, value);
            }
        }

        Self::from_vars(work_dir, &env_vars)
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(work_dir: &Path, vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str, default: &str| {
            vars.get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let platform = match vars.get("USPACK_PLATFORM") {
            Some(p) if !p.trim().is_empty() => p.parse()?,
            _ => Os::current().context(
                "Host operating system is not supported; set USPACK_PLATFORM explicitly",
            )?,
        };

        let build_type = match vars.get("USPACK_BUILD_TYPE") {
            Some(t) if !t.trim().is_empty() => t.parse()?,
            _ => BuildType::default(),
        };

        Ok(Self {
            name: PACKAGE_NAME.to_string(),
            version: get("USPACK_VERSION", DEFAULT_VERSION),
            git_url: get("USPACK_GIT_URL", DEFAULT_GIT_URL),
            branch_prefix: get("USPACK_BRANCH_PREFIX", DEFAULT_BRANCH_PREFIX),
            git: get("USPACK_GIT", "git"),
            cmake: get("USPACK_CMAKE", "cmake"),
            platform,
            build_type,
            arch: get("USPACK_ARCH", std::env::consts::ARCH),
            compiler: vars
                .get("USPACK_COMPILER")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            work_dir: work_dir.to_path_buf(),
            bundles: BUNDLES.iter().map(|b| b.to_string()).collect(),
        })
    }

    /// Override the upstream version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Override the target platform.
    pub fn with_platform(mut self, platform: Os) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = Some(compiler.into());
        self
    }

    /// Configured toolchain, or the platform's default.
    pub fn compiler(&self) -> &str {
        self.compiler
            .as_deref()
            .unwrap_or_else(|| self.platform.default_compiler())
    }

    /// Checkout location, named after the package.
    pub fn source_dir(&self) -> PathBuf {
        self.work_dir.join(&self.name)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.work_dir.join("build")
    }

    pub fn package_dir(&self) -> PathBuf {
        self.work_dir.join("package")
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  PACKAGE:        {}/{}", self.name, self.version);
        println!("  GIT_URL:        {}", self.git_url);
        println!("  BRANCH_PREFIX:  {}", self.branch_prefix);
        println!("  GIT:            {}", self.git);
        println!("  CMAKE:          {}", self.cmake);
        println!("  PLATFORM:       {}", self.platform);
        println!("  BUILD_TYPE:     {}", self.build_type);
        println!("  ARCH:           {}", self.arch);
        println!("  COMPILER:       {}", self.compiler());
        println!("  WORK_DIR:       {}", self.work_dir.display());
        println!("  BUNDLES:        {}", self.bundles.join(", "));
        if self.source_dir().exists() {
            println!("  Source tree: FOUND");
        } else {
            println!("  Source tree: NOT FOUND (run 'uspack source' to fetch)");
        }
    }
}
