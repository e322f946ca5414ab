//! Build switches passed to CMake as `-D<NAME>=<ON|OFF>` defines.
//!
//! The option set is a fixed declaration. A [`BuildConfiguration`] is created
//! fresh for each build from the defaults plus any user overrides.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Value domain shared by every option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl FromStr for Switch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            other => bail!("Invalid option value '{}' (expected ON or OFF)", other),
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A declared build switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOption {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Switch,
}

/// Every switch the upstream CMake project understands, with our defaults.
pub const OPTIONS: &[BuildOption] = &[
    BuildOption {
        name: "US_ENABLE_AUTOLOADING_SUPPORT",
        description: "Enable bundle auto-loading support",
        default: Switch::Off,
    },
    BuildOption {
        name: "US_ENABLE_THREADING_SUPPORT",
        description: "Enable threading support",
        default: Switch::Off,
    },
    BuildOption {
        name: "US_ENABLE_DEBUG_OUTPUT",
        description: "Enable debug messages",
        default: Switch::Off,
    },
    BuildOption {
        name: "US_BUILD_SHARED_LIBS",
        description: "Build shared libraries",
        default: Switch::On,
    },
    BuildOption {
        name: "US_BUILD_TESTING",
        description: "Build tests",
        default: Switch::Off,
    },
    BuildOption {
        name: "US_BUILD_EXAMPLES",
        description: "Build example projects",
        default: Switch::Off,
    },
];

/// Look up a declared option by name.
pub fn find_option(name: &str) -> Option<&'static BuildOption> {
    OPTIONS.iter().find(|o| o.name == name)
}

/// Chosen value for every declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    values: BTreeMap<&'static str, Switch>,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            values: OPTIONS.iter().map(|o| (o.name, o.default)).collect(),
        }
    }
}

impl BuildConfiguration {
    /// Set one option. Unknown names are rejected.
    pub fn with_override(mut self, name: &str, value: Switch) -> Result<Self> {
        let Some(option) = find_option(name) else {
            bail!(
                "Unknown option '{}'. Known options: {}",
                name,
                OPTIONS.iter().map(|o| o.name).collect::<Vec<_>>().join(", ")
            );
        };
        self.values.insert(option.name, value);
        Ok(self)
    }

    /// Apply `NAME=VALUE` assignments in order.
    pub fn with_assignments<I, S>(self, assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = self;
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let Some((name, value)) = assignment.split_once('=') else {
                bail!("Invalid option '{}' (expected NAME=VALUE)", assignment);
            };
            config = config.with_override(name.trim(), value.parse()?)?;
        }
        Ok(config)
    }

    pub fn get(&self, name: &str) -> Option<Switch> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Switch)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }

    /// One `-D<NAME>=<VALUE>` token per option, sorted by name.
    pub fn defines(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("-D{}={}", name, value))
            .collect()
    }
}
