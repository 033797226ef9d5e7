//! GitHub Actions Workflow Emitter
//!
//! Turns a [`GeneratorConfig`] into the CI workflow document.
//!
//! # Serialization
//!
//! Documents are written with `serde_yaml`, whose settings are per call: no
//! global formatter state is read or changed. Multi-line strings (the
//! metadata script, `run` blocks) are always written as literal block
//! scalars, which YAML never folds, so embedded scripts reach the runner
//! line for line.

use crate::workflow::build::build_job;
use crate::workflow::expr::BUILD_JOB;
use crate::workflow::publish::publish_jobs;
use crate::workflow::schema::{
    PermissionLevel, Permissions, PushTrigger, Workflow, WorkflowDispatchTrigger, WorkflowTriggers,
};
use crate::workflow::validate::validate;
use cigen_core::matrix::publishing_cell;
use cigen_core::{
    Emitter, Error, GeneratorConfig, MetadataPlan, PublishConfig, Registry, Result, expand,
};
use indexmap::IndexMap;
use tracing::instrument;

/// Comment block prepended to every generated document.
pub const GENERATION_HEADER: &str =
    "# Generated by cigen - do not edit manually\n# Regenerate with: cigen install\n\n";

/// GitHub Actions workflow generator.
///
/// # Config to workflow mapping
///
/// | Config | GitHub Actions |
/// |--------|----------------|
/// | `build.target` | `build` job `strategy.matrix.include` |
/// | `build.artifacts` | package / image step sequences in `build` |
/// | `publish.releases` | `publish-github-release` |
/// | `publish.packages` | `publish-{github,npm}-nodepkg` |
/// | `publish.images` | `publish-github-image` |
#[derive(Debug, Clone)]
pub struct WorkflowGenerator {
    /// Workflow name displayed in the GitHub UI
    pub name: String,
    /// Tag patterns that trigger the workflow
    pub tag_patterns: Vec<String>,
    /// Comment block written before the document
    pub header: String,
}

impl Default for WorkflowGenerator {
    fn default() -> Self {
        Self {
            name: "CI".to_string(),
            tag_patterns: vec!["v*".to_string()],
            header: GENERATION_HEADER.to_string(),
        }
    }
}

impl WorkflowGenerator {
    /// Create a generator with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflow name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the comment block written before the document
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Assemble and validate the workflow for `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid input, [`Error::DuplicateJob`]
    /// for clashing publish targets and [`Error::InvalidGraph`] if the
    /// assembled graph is inconsistent.
    #[instrument(name = "workflow_build", skip_all)]
    pub fn build(&self, config: &GeneratorConfig) -> Result<Workflow> {
        config.validate()?;

        let cells = expand(&config.build.target)?;
        if let Some(cell) = publishing_cell(&cells) {
            tracing::debug!(
                os = %cell.os,
                target = %cell.target_name(),
                "Publishing cell selected"
            );
        }

        let mut jobs = IndexMap::new();
        jobs.insert(
            BUILD_JOB.to_string(),
            build_job(&config.build, cells, !config.publish.images.is_empty()),
        );
        let runtime_versioned = config.build.target.has_runtime_versions();
        jobs.extend(publish_jobs(config.publish.targets(), runtime_versioned)?);

        let workflow = Workflow {
            name: self.name.clone(),
            on: self.triggers(),
            permissions: Some(permissions(&config.publish)),
            jobs,
        };

        validate(&workflow, &MetadataPlan::for_build(&config.build))?;
        tracing::debug!(jobs = workflow.jobs.len(), "Assembled workflow");
        Ok(workflow)
    }

    /// Assemble, validate and serialize the workflow for `config`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::build`] returns, plus [`Error::Serialization`].
    pub fn render(&self, config: &GeneratorConfig) -> Result<String> {
        let workflow = self.build(config)?;
        self.serialize(&workflow)
    }

    /// Serialize a workflow with the generation header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the YAML writer fails.
    pub fn serialize(&self, workflow: &Workflow) -> Result<String> {
        let yaml = serde_yaml::to_string(workflow).map_err(|e| Error::Serialization {
            message: e.to_string(),
        })?;
        tracing::info!(jobs = workflow.jobs.len(), bytes = yaml.len(), "Rendered workflow");
        Ok(format!("{}{yaml}", self.header))
    }

    fn triggers(&self) -> WorkflowTriggers {
        WorkflowTriggers {
            workflow_dispatch: Some(WorkflowDispatchTrigger {}),
            push: Some(PushTrigger {
                tags: self.tag_patterns.clone(),
            }),
        }
    }
}

/// `GITHUB_TOKEN` permissions needed by the configured publish targets.
fn permissions(publish: &PublishConfig) -> Permissions {
    let writes_packages = publish
        .packages
        .iter()
        .any(|p| p.registry == Registry::Hosted)
        || !publish.images.is_empty();

    Permissions {
        contents: Some(if publish.releases.is_empty() {
            PermissionLevel::Read
        } else {
            PermissionLevel::Write
        }),
        packages: writes_packages.then_some(PermissionLevel::Write),
    }
}

impl Emitter for WorkflowGenerator {
    fn emit(&self, config: &GeneratorConfig) -> Result<String> {
        self.render(config)
    }

    fn default_output_path(&self) -> &'static str {
        ".github/workflows/ci.yaml"
    }
}
