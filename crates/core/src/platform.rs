//! Mapping between logical OS names, GitHub-hosted runner labels and platform tags.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical platform tag used in artifact names and matrix entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux (`ubuntu-*` runners)
    Linux,
    /// macOS (`macos-*` runners)
    Mac,
    /// Windows (`windows-*` runners)
    Windows,
}

impl Platform {
    /// All logical platforms, in the order they are documented.
    pub const ALL: [Self; 3] = [Self::Linux, Self::Mac, Self::Windows];

    /// The logical name, also used as the platform tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }

    /// The default GitHub-hosted runner label for this platform.
    #[must_use]
    pub const fn default_runner(&self) -> &'static str {
        match self {
            Self::Linux => "ubuntu-latest",
            Self::Mac => "macos-latest",
            Self::Windows => "windows-latest",
        }
    }

    /// Runner label prefix identifying this platform.
    const fn runner_prefix(&self) -> &'static str {
        match self {
            Self::Linux => "ubuntu-",
            Self::Mac => "macos-",
            Self::Windows => "windows-",
        }
    }

    /// `win` is accepted as a shorthand for `windows`.
    fn from_logical(name: &str) -> Option<Self> {
        match name {
            "win" => Some(Self::Windows),
            _ => Self::ALL.into_iter().find(|p| p.as_str() == name),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve an OS identifier to a runner label.
///
/// Logical names map to their `*-latest` runner; anything else is taken to be
/// a concrete runner label already and is returned unchanged.
#[must_use]
pub fn resolve_runner(os: &str) -> String {
    Platform::from_logical(os).map_or_else(|| os.to_string(), |p| p.default_runner().to_string())
}

/// Resolve an OS identifier (logical name or runner label) to its platform tag.
///
/// # Errors
///
/// Returns [`Error::UnrecognizedOs`] when `os` is neither a logical name nor
/// starts with a known runner prefix.
pub fn resolve_platform_tag(os: &str) -> Result<Platform> {
    if let Some(platform) = Platform::from_logical(os) {
        return Ok(platform);
    }
    Platform::ALL
        .into_iter()
        .find(|p| os.starts_with(p.runner_prefix()))
        .ok_or_else(|| Error::unrecognized_os(os))
}
