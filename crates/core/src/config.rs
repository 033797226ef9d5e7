//! Generator configuration: build targets, artifact kinds and publish targets.
//!
//! The configuration is a plain value. How it was produced (CLI flags,
//! project detection) is the caller's business; [`GeneratorConfig::validate`]
//! checks everything that can be checked before a workflow is assembled.

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::platform::resolve_platform_tag;
use std::fmt;
use std::str::FromStr;

/// The OS x arch x runtime-version space a build fans out over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Logical OS names or runner labels, in priority order
    pub operating_systems: Vec<String>,
    /// CPU architectures (e.g. `x64`, `arm64`)
    pub architectures: Vec<String>,
    /// Runtime versions; empty means the build is not runtime-versioned
    pub runtime_versions: Vec<String>,
}

impl BuildTarget {
    /// Create a target without runtime versions.
    #[must_use]
    pub fn new<S: Into<String>>(
        operating_systems: impl IntoIterator<Item = S>,
        architectures: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            operating_systems: operating_systems.into_iter().map(Into::into).collect(),
            architectures: architectures.into_iter().map(Into::into).collect(),
            runtime_versions: Vec::new(),
        }
    }

    /// Add runtime versions to the target.
    #[must_use]
    pub fn with_runtime_versions<S: Into<String>>(
        mut self,
        versions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.runtime_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the matrix carries a runtime-version dimension.
    #[must_use]
    pub fn has_runtime_versions(&self) -> bool {
        !self.runtime_versions.is_empty()
    }

    /// Check the non-empty invariants and that every OS is recognized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTarget`] or [`Error::UnrecognizedOs`].
    pub fn validate(&self) -> Result<()> {
        if self.operating_systems.is_empty() {
            return Err(Error::EmptyTarget { field: "os" });
        }
        if self.architectures.is_empty() {
            return Err(Error::EmptyTarget { field: "arch" });
        }
        for os in &self.operating_systems {
            resolve_platform_tag(os)?;
        }
        Ok(())
    }
}

/// A category of build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// A Node.js package tarball (`npm pack`)
    LanguagePackage,
    /// A container image exported as a tarball
    ContainerImage,
}

impl ArtifactKind {
    /// Human-readable label used in messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LanguagePackage => "Node.js package",
            Self::ContainerImage => "image",
        }
    }
}

/// The set of artifact kinds a build produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactKinds {
    /// Build, test, pack and upload a language package
    pub language_package: bool,
    /// Build and upload a container image
    pub container_image: bool,
}

impl ArtifactKinds {
    /// Whether `kind` is enabled.
    #[must_use]
    pub const fn contains(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::LanguagePackage => self.language_package,
            ArtifactKind::ContainerImage => self.container_image,
        }
    }

    /// Enabled kinds in build order (package first, then image).
    pub fn iter(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        [ArtifactKind::LanguagePackage, ArtifactKind::ContainerImage]
            .into_iter()
            .filter(|kind| self.contains(*kind))
    }
}

/// Build-side configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Target matrix
    pub target: BuildTarget,
    /// Artifacts produced per matrix cell
    pub artifacts: ArtifactKinds,
}

/// Where an artifact is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registry {
    /// The repository host's own registry (GitHub Packages / ghcr.io / Releases)
    Hosted,
    /// The public package registry (npmjs.org)
    Public,
}

impl Registry {
    /// Parse a registry token.
    ///
    /// `hosted` also answers to `gh` and `github`; `public` to `npm`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegistry`] for unknown tokens.
    pub fn parse(kind: &'static str, token: &str, valid: &'static str) -> Result<Self> {
        match token.trim() {
            "hosted" | "gh" | "github" => Ok(Self::Hosted),
            "public" | "npm" => Ok(Self::Public),
            other => Err(Error::InvalidRegistry {
                kind,
                registry: other.to_string(),
                valid,
            }),
        }
    }

    /// Host name used in job ids (`publish-<slug>-...`).
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Hosted => "github",
            Self::Public => "npm",
        }
    }

    /// Display name used in job titles.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Hosted => "GitHub",
            Self::Public => "NPM",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hosted => "hosted",
            Self::Public => "public",
        })
    }
}

/// Parse a hosted-only registry token (releases and images).
fn parse_hosted_only(kind: &'static str, token: &str) -> Result<Registry> {
    match Registry::parse(kind, token, "hosted")? {
        Registry::Hosted => Ok(Registry::Hosted),
        Registry::Public => Err(Error::InvalidRegistry {
            kind,
            registry: token.trim().to_string(),
            valid: "hosted",
        }),
    }
}

/// A release created on the hosted release channel for version tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseChannel {
    /// Release host (only [`Registry::Hosted`] is supported)
    pub registry: Registry,
    /// Attach the language package to the release
    pub includes_package: bool,
    /// Attach the container image tarball to the release
    pub includes_image: bool,
}

impl ReleaseChannel {
    /// Parse a release registry token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegistry`] unless the token names the hosted registry.
    pub fn parse(token: &str, includes_package: bool, includes_image: bool) -> Result<Self> {
        Ok(Self {
            registry: parse_hosted_only("release", token)?,
            includes_package,
            includes_image,
        })
    }
}

/// A package registry the language package is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageRegistry {
    /// Target registry
    pub registry: Registry,
    /// Publish with public access
    pub public_access: bool,
}

impl FromStr for PackageRegistry {
    type Err = Error;

    /// Parse `registry[:public]`, e.g. `hosted`, `public:public`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, flag) = match s.split_once(':') {
            Some((name, flag)) => (name, Some(flag.trim())),
            None => (s, None),
        };
        let registry = Registry::parse("package", name, "hosted, public")?;
        let public_access = match flag {
            None => false,
            Some("public") => true,
            Some(other) => {
                return Err(Error::InvalidRegistryFlag {
                    kind: "package",
                    flag: other.to_string(),
                });
            }
        };
        Ok(Self {
            registry,
            public_access,
        })
    }
}

/// A container registry the image is pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRegistry {
    /// Target registry (only [`Registry::Hosted`] is supported)
    pub registry: Registry,
}

impl FromStr for ImageRegistry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self {
            registry: parse_hosted_only("image", s)?,
        })
    }
}

/// One configured publish destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTarget {
    /// Create a release and attach artifacts
    ReleaseChannel(ReleaseChannel),
    /// Publish the language package
    PackageRegistry(PackageRegistry),
    /// Push the container image
    ImageRegistry(ImageRegistry),
}

impl PublishTarget {
    /// Artifact kinds this target consumes from the build job.
    #[must_use]
    pub fn consumes(&self) -> ArtifactKinds {
        match self {
            Self::ReleaseChannel(release) => ArtifactKinds {
                language_package: release.includes_package,
                container_image: release.includes_image,
            },
            Self::PackageRegistry(_) => ArtifactKinds {
                language_package: true,
                container_image: false,
            },
            Self::ImageRegistry(_) => ArtifactKinds {
                language_package: false,
                container_image: true,
            },
        }
    }
}

/// Publish-side configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishConfig {
    /// Release channels
    pub releases: Vec<ReleaseChannel>,
    /// Package registries
    pub packages: Vec<PackageRegistry>,
    /// Image registries
    pub images: Vec<ImageRegistry>,
}

impl PublishConfig {
    /// All targets in job order: releases, package registries, image registries.
    pub fn targets(&self) -> impl Iterator<Item = PublishTarget> + '_ {
        self.releases
            .iter()
            .copied()
            .map(PublishTarget::ReleaseChannel)
            .chain(self.packages.iter().copied().map(PublishTarget::PackageRegistry))
            .chain(self.images.iter().copied().map(PublishTarget::ImageRegistry))
    }

    /// Whether any target is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty() && self.packages.is_empty() && self.images.is_empty()
    }
}

/// Everything the workflow generator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Publish configuration
    pub publish: PublishConfig,
    /// Project package manifest, when present
    pub manifest: Option<Manifest>,
}

impl GeneratorConfig {
    /// Validate the configuration as a whole.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyTarget`] / [`Error::UnrecognizedOs`] for a bad target
    /// - [`Error::ManifestRequired`] when a package build has no manifest
    /// - [`Error::InvalidPackageName`] when the manifest name is not scoped
    /// - [`Error::ArtifactNotBuilt`] when a publish target needs an artifact the build skips
    pub fn validate(&self) -> Result<()> {
        self.build.target.validate()?;

        if self.build.artifacts.language_package {
            let manifest = self.manifest.as_ref().ok_or(Error::ManifestRequired)?;
            manifest.scope()?;
        }

        for target in self.publish.targets() {
            if let Some(kind) = target
                .consumes()
                .iter()
                .find(|kind| !self.build.artifacts.contains(*kind))
            {
                return Err(Error::ArtifactNotBuilt { kind: kind.label() });
            }
        }

        Ok(())
    }
}

/// Parse a boolean option value (`true`/`1`/`false`/`0`, case-insensitive).
///
/// # Errors
///
/// Returns [`Error::InvalidBool`] for anything else.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidBool {
            value: value.to_string(),
        }),
    }
}

/// Split a comma-separated list option into trimmed, non-empty items.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
