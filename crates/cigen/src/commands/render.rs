//! `cigen render`: print the workflow.

use crate::cli::{CliError, RenderArgs};
use crate::commands::resolve_config;
use crate::project::Project;
use cigen_core::Emitter;
use cigen_github::WorkflowGenerator;
use tracing::instrument;

/// Render the GitHub Actions workflow for the project the arguments point at.
///
/// # Errors
///
/// Returns an error if detection, option resolution or generation fails.
pub fn execute(args: &RenderArgs) -> Result<String, CliError> {
    render_with(&WorkflowGenerator::new(), args)
}

/// Render with a specific emitter.
///
/// # Errors
///
/// Returns an error if detection, option resolution or generation fails.
#[instrument(name = "render", skip_all)]
pub fn render_with(emitter: &dyn Emitter, args: &RenderArgs) -> Result<String, CliError> {
    let project = Project::detect(&args.project_dir)?;
    let config = resolve_config(args, &project)?;
    let document = emitter.emit(&config)?;
    tracing::info!(bytes = document.len(), "Workflow rendered");
    Ok(document)
}
