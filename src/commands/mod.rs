//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Run pipeline phases (source, build, deps, package, create)
//! - `info` - Print the package info declaration
//! - `show` - Display configuration and options
//! - `clean` - Remove source/build/package trees
//! - `preflight` - Check host tools

pub mod build;
pub mod clean;
mod info;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use info::cmd_info;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
