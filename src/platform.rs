//! Target platform identifier and build settings.

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Operating system family the package is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    MacOs,
    Windows,
}

impl Os {
    /// Detect the host operating system.
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }

    /// Linux needs `dl` linked explicitly for bundle loading.
    pub fn is_linux_family(&self) -> bool {
        matches!(self, Self::Linux)
    }

    /// Toolchain assumed when none is configured.
    pub fn default_compiler(&self) -> &'static str {
        match self {
            Self::Linux => "gcc",
            Self::MacOs => "apple-clang",
            Self::Windows => "msvc",
        }
    }
}

impl FromStr for Os {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::MacOs),
            "windows" => Ok(Self::Windows),
            other => bail!(
                "Unsupported platform '{}' (expected linux, macos or windows)",
                other
            ),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// CMake build type. Multi-config generators also use it as the output
/// subdirectory name (`lib/Release`, `bin/Debug`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub const ALL: &'static [BuildType] = &[
        Self::Debug,
        Self::Release,
        Self::RelWithDebInfo,
        Self::MinSizeRel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        match Self::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
        {
            Some(t) => Ok(*t),
            None => bail!(
                "Unsupported build type '{}' (expected Debug, Release, RelWithDebInfo or MinSizeRel)",
                wanted
            ),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
