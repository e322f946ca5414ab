//! Uspack - CppMicroServices packager.
//!
//! Drives git and cmake to produce a package tree:
//! - `<bundle>/include`, `third_party`, `include` headers
//! - `lib/` shared, static and import libraries
//! - `cmake/` functions plus the exported CMake config files
//! - `package_info.json` describing what consumers link

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use uspack::clean::CleanTarget as Clean;
use uspack::config::Config;
use uspack::options::BuildConfiguration;
use uspack::pipeline::Pipeline;
use uspack::platform::{BuildType, Os};
use uspack::process::SystemRunner;

use commands::build::Phase;

#[derive(Parser)]
#[command(name = "uspack")]
#[command(about = "CppMicroServices packager")]
#[command(
    after_help = "QUICK START:\n  uspack preflight  Check git and cmake\n  uspack create     Clone, build and package\n  uspack info       Show what consumers link\n  uspack clean      Remove build and package trees"
)]
struct Cli {
    /// Directory holding the source, build and package trees
    #[arg(long, global = true, default_value = ".")]
    work_dir: PathBuf,

    /// Upstream version to package (overrides USPACK_VERSION)
    #[arg(long, global = true)]
    pkg_version: Option<String>,

    /// Target platform: linux, macos or windows (overrides USPACK_PLATFORM)
    #[arg(long, global = true)]
    platform: Option<Os>,

    /// CMake build type (overrides USPACK_BUILD_TYPE, default Release)
    #[arg(long, global = true)]
    build_type: Option<BuildType>,

    /// Target architecture (overrides USPACK_ARCH)
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Toolchain name recorded in the package id (overrides USPACK_COMPILER)
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// Build option override, e.g. -o US_BUILD_TESTING=ON
    #[arg(short = 'o', long = "option", global = true, value_name = "NAME=VALUE")]
    options: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone the upstream source (skipped if already present)
    Source,

    /// Configure and build (clones the source if missing)
    Build,

    /// Extract link dependencies from the build tree
    Deps,

    /// Harvest headers, libraries and CMake files into the package tree
    Package,

    /// Run the full pipeline (default)
    Create,

    /// Print the package info declaration
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Clean build outputs (default: build + package, preserves source)
    Clean {
        #[command(subcommand)]
        what: Option<CleanTarget>,
    },

    /// Check that git and cmake are available
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show build options
    Options,
}

#[derive(Subcommand)]
enum CleanTarget {
    /// Build tree only
    Build,
    /// Package tree only
    Package,
    /// Source checkout only
    Source,
    /// Everything
    All,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("USPACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let work_dir = std::path::absolute(&cli.work_dir)
        .with_context(|| format!("Invalid work dir {}", cli.work_dir.display()))?;

    let mut config = Config::load(&work_dir)?;
    if let Some(version) = cli.pkg_version {
        config = config.with_version(version);
    }
    if let Some(platform) = cli.platform {
        config = config.with_platform(platform);
    }
    if let Some(build_type) = cli.build_type {
        config = config.with_build_type(build_type);
    }
    if let Some(arch) = cli.arch {
        config = config.with_arch(arch);
    }
    if let Some(compiler) = cli.compiler {
        config = config.with_compiler(compiler);
    }
    let config = config;

    let options = BuildConfiguration::default().with_assignments(&cli.options)?;
    let runner = SystemRunner;
    let pipeline = Pipeline::new(&config, options, &runner);

    match cli.command.unwrap_or(Commands::Create) {
        Commands::Source => commands::cmd_build(&pipeline, Phase::Source)?,
        Commands::Build => commands::cmd_build(&pipeline, Phase::Build)?,
        Commands::Deps => commands::cmd_build(&pipeline, Phase::Deps)?,
        Commands::Package => commands::cmd_build(&pipeline, Phase::Package)?,
        Commands::Create => commands::cmd_build(&pipeline, Phase::Create)?,

        Commands::Info { json } => commands::cmd_info(&pipeline, json)?,

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Options => commands::show::ShowTarget::Options,
            };
            commands::cmd_show(show_target, &config, &pipeline.options)?;
        }

        Commands::Clean { what } => {
            let clean_target = match what {
                None => Clean::Outputs,
                Some(CleanTarget::Build) => Clean::Build,
                Some(CleanTarget::Package) => Clean::Package,
                Some(CleanTarget::Source) => Clean::Source,
                Some(CleanTarget::All) => Clean::All,
            };
            commands::cmd_clean(&config, clean_target)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }
    }

    Ok(())
}
