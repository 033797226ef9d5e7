//! `cigen install`: write the workflow into the repository.

use crate::cli::{CliError, RenderArgs};
use crate::commands::render;
use crate::prompt::confirm;
use cigen_core::Emitter;
use cigen_github::WorkflowGenerator;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Result of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct Installed {
    /// Path the workflow was written to
    pub path: PathBuf,
    /// Whether an existing file was replaced
    pub overwritten: bool,
}

/// Render the workflow and write it to `output`, or to the emitter's default
/// path when `output` is `None`.
///
/// A relative `output` is resolved against the project directory. An
/// existing file is only replaced after confirmation (or with `assume_yes`).
/// The document is rendered before anything touches the filesystem.
///
/// # Errors
///
/// Returns an error if rendering fails, the overwrite is declined or refused,
/// or the file cannot be written.
#[instrument(name = "install", skip(args))]
pub fn execute(
    args: &RenderArgs,
    output: Option<&Path>,
    assume_yes: bool,
) -> Result<Installed, CliError> {
    let emitter = WorkflowGenerator::new();
    let document = render::render_with(&emitter, args)?;
    let output = output.unwrap_or_else(|| Path::new(emitter.default_output_path()));
    let path = if output.is_absolute() {
        output.to_path_buf()
    } else {
        args.project_dir.join(output)
    };

    let overwritten = path.exists();
    if overwritten && !confirm(&format!("Overwrite {}?", path.display()), true, assume_yes)? {
        return Err(CliError::config_with_help(
            format!("Not overwriting {}", path.display()),
            "Pass --yes to replace the existing workflow",
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::io("create", parent, &e))?;
    }
    std::fs::write(&path, document).map_err(|e| CliError::io("write", &path, &e))?;

    tracing::info!(path = %path.display(), overwritten, "Workflow installed");
    Ok(Installed { path, overwritten })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &TempDir) -> RenderArgs {
        RenderArgs {
            project_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_install_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let installed = execute(&args(&dir), None, false).unwrap();

        assert_eq!(installed.path, dir.path().join(".github/workflows/ci.yaml"));
        assert!(!installed.overwritten);
        let content = std::fs::read_to_string(&installed.path).unwrap();
        assert!(content.starts_with("# Generated by cigen"));
    }

    #[test]
    fn test_install_overwrites_with_yes() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("ci.yaml");
        std::fs::write(&target, "old").unwrap();

        let installed = execute(&args(&dir), Some(target.as_path()), true).unwrap();
        assert!(installed.overwritten);
        assert_ne!(std::fs::read_to_string(&target).unwrap(), "old");
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir);
        args.build_target_arch = Some(String::new());

        assert!(execute(&args, Some(Path::new("ci.yaml")), true).is_err());
        assert!(!dir.path().join("ci.yaml").exists());
    }
}
