//! Project detection.
//!
//! The files present in the project directory decide the option defaults:
//! a `package.json` turns on the Node.js package, a `Dockerfile` the image.

use crate::cli::CliError;
use cigen_core::Manifest;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Name of the container build file.
pub const DOCKERFILE: &str = "Dockerfile";

/// What was found in the project directory.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Project root
    pub root: PathBuf,
    /// Parsed `package.json`, when present
    pub manifest: Option<Manifest>,
    /// Whether a `Dockerfile` exists
    pub has_dockerfile: bool,
}

impl Project {
    /// Inspect `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `package.json` exists but cannot be read or parsed.
    pub fn detect(root: &Path) -> Result<Self, CliError> {
        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = match std::fs::read_to_string(&manifest_path) {
            Ok(content) => Some(Manifest::from_package_json(&content).map_err(|e| {
                CliError::config_with_help(
                    format!("{}: {e}", manifest_path.display()),
                    "Fix the manifest or run from a different --project-dir",
                )
            })?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(CliError::io("read", &manifest_path, &e)),
        };
        let has_dockerfile = root.join(DOCKERFILE).is_file();

        tracing::debug!(
            root = %root.display(),
            manifest = manifest.as_ref().map(|m| m.name.as_str()),
            has_dockerfile,
            "Detected project"
        );

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            has_dockerfile,
        })
    }

    /// Whether a package manifest was found.
    #[must_use]
    pub const fn has_manifest(&self) -> bool {
        self.manifest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let project = Project::detect(dir.path()).unwrap();
        assert!(!project.has_manifest());
        assert!(!project.has_dockerfile);
    }

    #[test]
    fn test_manifest_and_dockerfile() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "@acme/widget", "version": "1.0.0", "engines": {"node": ">=18"}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "FROM scratch\n").unwrap();

        let project = Project::detect(dir.path()).unwrap();
        let manifest = project.manifest.unwrap();
        assert_eq!(manifest.name, "@acme/widget");
        assert_eq!(manifest.minimum_runtime_version.as_deref(), Some("18.0.0"));
        assert!(project.has_dockerfile);
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let err = Project::detect(dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
