//! GitHub Actions Workflow Schema Types
//!
//! Defines the data structures for GitHub Actions workflow YAML generation.
//! See: <https://docs.github.com/en/actions/using-workflows/workflow-syntax-for-github-actions>
//!
//! All maps are `IndexMap`s so that emitted documents are byte-for-byte
//! reproducible.

use cigen_core::MatrixCell;
use indexmap::IndexMap;
use serde::Serialize;

/// A GitHub Actions workflow definition.
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    /// Workflow name displayed in GitHub UI
    pub name: String,

    /// Trigger configuration
    #[serde(rename = "on")]
    pub on: WorkflowTriggers,

    /// Default permissions for `GITHUB_TOKEN`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    /// Job definitions (order preserved via `IndexMap`)
    pub jobs: IndexMap<String, Job>,
}

/// Workflow trigger configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowTriggers {
    /// Manual trigger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<WorkflowDispatchTrigger>,

    /// Trigger on push events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,
}

/// Manual workflow dispatch trigger (no inputs).
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowDispatchTrigger {}

/// Push event trigger configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushTrigger {
    /// Tag patterns to trigger on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// `GITHUB_TOKEN` permissions configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Permissions {
    /// Repository contents permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<PermissionLevel>,

    /// GitHub Packages permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<PermissionLevel>,
}

/// Permission level for `GITHUB_TOKEN` scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read-only access
    Read,
    /// Read and write access
    Write,
}

/// A job in a GitHub Actions workflow.
///
/// Jobs run in parallel by default unless `needs` dependencies are specified.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Job display name (shown in GitHub UI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Runner label, possibly an expression
    pub runs_on: String,

    /// Conditional execution expression
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<String>,

    /// Job dependencies (these jobs must complete first)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    /// Matrix strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Job outputs readable by dependent jobs
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, String>,

    /// Job steps (executed sequentially)
    pub steps: Vec<Step>,
}

impl Job {
    /// Create a job with a runner and no steps.
    pub fn new(name: impl Into<String>, runs_on: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            runs_on: runs_on.into(),
            if_condition: None,
            needs: Vec::new(),
            strategy: None,
            outputs: IndexMap::new(),
            steps: Vec::new(),
        }
    }

    /// Set a condition
    #[must_use]
    pub fn with_if(mut self, condition: impl Into<String>) -> Self {
        self.if_condition = Some(condition.into());
        self
    }

    /// Add a dependency
    #[must_use]
    pub fn with_need(mut self, job: impl Into<String>) -> Self {
        let job = job.into();
        if !self.needs.contains(&job) {
            self.needs.push(job);
        }
        self
    }

    /// Set the steps
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    /// Ids of the steps that declare one.
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| s.id.as_deref())
    }
}

/// Matrix strategy for a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Strategy {
    /// Matrix definition
    pub matrix: Matrix,

    /// Cancel all in-progress cells if any cell fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,
}

/// Matrix expressed as an explicit list of fully-specified cells.
#[derive(Debug, Clone, Serialize)]
pub struct Matrix {
    /// One entry per cell
    pub include: Vec<MatrixCell>,
}

/// A step in a job.
///
/// Steps can either `uses` an action or `run` a shell command.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    /// Step display name (shown in GitHub UI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unique identifier for referencing step outputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Conditional execution expression
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<String>,

    /// Action to use (e.g., "actions/checkout@v4")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    /// Shell command(s) to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Shell to use for run commands (e.g., "bash", "pwsh")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    /// Step environment variables
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    /// Action inputs (for `uses` steps)
    #[serde(rename = "with", skip_serializing_if = "IndexMap::is_empty")]
    pub with_inputs: IndexMap<String, serde_yaml::Value>,
}

impl Step {
    /// Create a step that uses an action
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    /// Create a step that runs a shell command
    pub fn run(command: impl Into<String>) -> Self {
        Self {
            run: Some(command.into()),
            ..Default::default()
        }
    }

    /// Set the step name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the step ID
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a with input
    #[must_use]
    pub fn with_input(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_yaml::Value>,
    ) -> Self {
        self.with_inputs.insert(key.into(), value.into());
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the shell for `run` steps
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }
}
