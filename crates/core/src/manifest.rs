//! Project package manifest (`package.json`).

use crate::error::{Error, Result};
use semver::{Comparator, Op, Version, VersionReq};
use serde::Deserialize;

/// The subset of the package manifest the generator relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Package name, expected as `@owner/name`
    pub name: String,
    /// Package version
    pub version: String,
    /// Lowest runtime version allowed by the manifest's engine constraint
    pub minimum_runtime_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    engines: Option<Engines>,
}

#[derive(Debug, Deserialize)]
struct Engines {
    #[serde(default)]
    node: Option<String>,
}

impl Manifest {
    /// Parse a `package.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if the JSON is malformed or has no `name`.
    pub fn from_package_json(content: &str) -> Result<Self> {
        let pkg: PackageJson =
            serde_json::from_str(content).map_err(|e| Error::InvalidManifest {
                message: e.to_string(),
            })?;

        let minimum_runtime_version = pkg.engines.and_then(|e| e.node).and_then(|range| {
            let min = minimum_version(&range);
            if min.is_none() {
                tracing::warn!(range = %range, "Ignoring unparseable engines.node range");
            }
            min
        });

        Ok(Self {
            name: pkg.name,
            version: pkg.version.unwrap_or_else(|| "0.0.0".to_string()),
            minimum_runtime_version,
        })
    }

    /// The owner scope of a scoped package name (`@acme/widget` -> `acme`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPackageName`] for unscoped names.
    pub fn scope(&self) -> Result<&str> {
        self.name
            .strip_prefix('@')
            .and_then(|rest| rest.split_once('/'))
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
            .map(|(owner, _)| owner)
            .ok_or_else(|| Error::InvalidPackageName {
                name: self.name.clone(),
            })
    }
}

/// Lowest version satisfying an npm-style range, e.g. `>=16.3 <19` -> `16.3.0`.
///
/// Alternatives separated by `||` yield the smallest of their lower bounds.
#[must_use]
pub fn minimum_version(range: &str) -> Option<String> {
    range
        .split("||")
        .map(|alternative| {
            let req = VersionReq::parse(&normalize_range(alternative)).ok()?;
            lower_bound(&req)
        })
        .collect::<Option<Vec<_>>>()?
        .into_iter()
        .min()
        .map(|v| v.to_string())
}

/// Turn npm's space-separated comparator sets into the comma-separated form
/// `semver` parses, keeping `>= 16` style operators attached to their version.
fn normalize_range(range: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in range.split_whitespace() {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => parts.push(format!("{op}{token}")),
            None => parts.push(token.to_string()),
        }
    }
    parts.join(", ")
}

/// `None` when a bound cannot be represented (e.g. `>1.2.<u64::MAX>`).
fn lower_bound(req: &VersionReq) -> Option<Version> {
    req.comparators
        .iter()
        .map(comparator_floor)
        .collect::<Option<Vec<_>>>()
        .map(|floors| floors.into_iter().max().unwrap_or_else(|| Version::new(0, 0, 0)))
}

fn comparator_floor(c: &Comparator) -> Option<Version> {
    let minor = c.minor.unwrap_or(0);
    let patch = c.patch.unwrap_or(0);
    match c.op {
        Op::Greater => match (c.minor, c.patch) {
            (Some(_), Some(_)) => Some(Version::new(c.major, minor, patch.checked_add(1)?)),
            (Some(_), None) => Some(Version::new(c.major, minor.checked_add(1)?, 0)),
            _ => Some(Version::new(c.major.checked_add(1)?, 0, 0)),
        },
        Op::Less | Op::LessEq => Some(Version::new(0, 0, 0)),
        _ => Some(Version::new(c.major, minor, patch)),
    }
}
