//! Uspack library exports.
//!
//! Packages CppMicroServices: clone a pinned release branch, configure and
//! build it with CMake, extract its link dependencies, and harvest headers,
//! libraries and CMake metadata into a normalized package tree.

pub mod build;
pub mod clean;
pub mod config;
pub mod deps;
pub mod harvest;
pub mod options;
pub mod package_info;
pub mod pipeline;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod source;
pub mod timing;
