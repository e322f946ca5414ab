//! Configure and build the upstream CMake project.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::options::BuildConfiguration;
use crate::platform::BuildType;
use crate::process::{Cmd, CommandRunner};
use crate::source::{self, SourceTree};

/// Output of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTree {
    pub path: PathBuf,
}

impl BuildTree {
    /// Wrap an existing build directory.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            bail!(
                "Build tree not found at {}. Run 'uspack build' first.",
                path.display()
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Directory CMake writes libraries into.
    pub fn lib_dir(&self) -> PathBuf {
        self.path.join("lib")
    }
}

/// `cmake <src> -B<build> -D...` with one define per option.
pub fn configure_cmd(cmake: &str, source: &Path, build: &Path, options: &BuildConfiguration) -> Cmd {
    Cmd::new(cmake)
        .arg_path(source)
        .arg(format!("-B{}", build.display()))
        .args(options.defines())
        .error_msg("CMake configure failed")
}

/// `cmake --build <build> --config <type>`.
///
/// Single-config generators ignore `--config`; multi-config ones (Visual
/// Studio, Xcode) build only that configuration.
pub fn build_cmd(cmake: &str, build: &Path, build_type: BuildType) -> Cmd {
    Cmd::new(cmake)
        .arg("--build")
        .arg_path(build)
        .args(["--config", build_type.as_str()])
        .error_msg("CMake build failed")
        .interactive()
}

/// Configure then build. The build step only runs if configure succeeded.
///
/// Acquires the source tree first when it is missing.
pub fn build(
    config: &Config,
    options: &BuildConfiguration,
    runner: &dyn CommandRunner,
) -> Result<(SourceTree, BuildTree)> {
    let (source, _) = source::acquire(config, runner)?;
    let build_dir = config.build_dir();

    fs::create_dir_all(&build_dir)
        .with_context(|| format!("Failed to create {}", build_dir.display()))?;

    println!("  Configuring {}...", source.path.display());
    configure_cmd(&config.cmake, &source.path, &build_dir, options).run(runner)?;

    println!("  Building into {}...", build_dir.display());
    build_cmd(&config.cmake, &build_dir, config.build_type).run(runner)?;

    Ok((source, BuildTree { path: build_dir }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_passes_dirs_and_defines() {
        let options = BuildConfiguration::default();
        let cmd = configure_cmd("cmake", Path::new("/w/src"), Path::new("/w/build"), &options);
        let args = cmd.get_args();

        assert_eq!(args[0], "/w/src");
        assert_eq!(args[1], "-B/w/build");
        assert_eq!(&args[2..], options.defines().as_slice());
    }

    #[test]
    fn build_takes_output_dir_and_build_type() {
        let cmd = build_cmd("cmake", Path::new("/w/build"), BuildType::Release);
        assert_eq!(cmd.get_args(), ["--build", "/w/build", "--config", "Release"]);

        let cmd = build_cmd("cmake", Path::new("/w/build"), BuildType::Debug);
        assert_eq!(cmd.get_args()[3], "Debug");
    }

    #[test]
    fn open_missing_build_tree_fails() {
        let err = BuildTree::open(Path::new("/nonexistent_build_12345")).unwrap_err();
        assert!(err.to_string().contains("uspack build"));
    }
}
