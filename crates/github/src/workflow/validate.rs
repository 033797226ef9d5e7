//! Structural checks on an assembled job graph.
//!
//! Runs after assembly and before serialization. Any violation is reported as
//! [`Error::InvalidGraph`], so a broken graph never reaches disk.

use crate::workflow::expr::BUILD_JOB;
use crate::workflow::schema::{Job, Workflow};
use cigen_core::{Error, MetadataPlan, Result};
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::HashSet;

const NEEDS_REF: &str = r"needs\.([A-Za-z0-9_-]+)\.outputs";
const STEPS_REF: &str = r"steps\.([A-Za-z0-9_-]+)\.outputs";
const METADATA_REF: &str =
    r"fromJson\((?:steps|needs)\.[A-Za-z0-9_-]+\.outputs\.[A-Za-z0-9_]+\)((?:\.[A-Za-z0-9_]+)+)";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::invalid_graph(e.to_string()))
}

/// Validate a workflow's job graph.
///
/// Checks that:
/// - `build` exists and needs nothing,
/// - every `needs` entry names a job in the graph and the graph is acyclic,
/// - every `needs.<job>.outputs` reference is listed in the job's `needs`,
/// - every `steps.<id>.outputs` reference names a step of the same job,
/// - every metadata path read is one the build actually writes.
///
/// # Errors
///
/// Returns [`Error::InvalidGraph`] describing the first violation found.
pub fn validate(workflow: &Workflow, plan: &MetadataPlan) -> Result<()> {
    let build = workflow
        .jobs
        .get(BUILD_JOB)
        .ok_or_else(|| Error::invalid_graph(format!("missing '{BUILD_JOB}' job")))?;
    if !build.needs.is_empty() {
        return Err(Error::invalid_graph(format!(
            "'{BUILD_JOB}' must not depend on other jobs"
        )));
    }

    check_dependencies(&workflow.jobs)?;

    let needs_ref = compile(NEEDS_REF)?;
    let steps_ref = compile(STEPS_REF)?;
    let metadata_ref = compile(METADATA_REF)?;

    for (name, job) in &workflow.jobs {
        let text = serde_json::to_string(job).map_err(|e| Error::Serialization {
            message: e.to_string(),
        })?;
        check_job_refs(name, job, &text, &needs_ref, &steps_ref)?;
        check_metadata_paths(name, &text, &metadata_ref, plan)?;
    }

    tracing::debug!(jobs = workflow.jobs.len(), "Job graph validated");
    Ok(())
}

fn check_dependencies(jobs: &IndexMap<String, Job>) -> Result<()> {
    let mut graph = DiGraph::<&str, ()>::new();
    let index: IndexMap<&str, NodeIndex> = jobs
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    for (name, job) in jobs {
        let to = index[name.as_str()];
        for need in &job.needs {
            let from = index.get(need.as_str()).ok_or_else(|| {
                Error::invalid_graph(format!("job '{name}' needs unknown job '{need}'"))
            })?;
            graph.add_edge(*from, to, ());
        }
    }

    toposort(&graph, None).map_err(|cycle| {
        Error::invalid_graph(format!(
            "dependency cycle through job '{}'",
            graph[cycle.node_id()]
        ))
    })?;
    Ok(())
}

fn check_job_refs(
    name: &str,
    job: &Job,
    text: &str,
    needs_ref: &Regex,
    steps_ref: &Regex,
) -> Result<()> {
    for caps in needs_ref.captures_iter(text) {
        let target = &caps[1];
        if !job.needs.iter().any(|n| n == target) {
            return Err(Error::invalid_graph(format!(
                "job '{name}' reads outputs of '{target}' without needing it"
            )));
        }
    }

    let step_ids: HashSet<&str> = job.step_ids().collect();
    for caps in steps_ref.captures_iter(text) {
        let step = &caps[1];
        if !step_ids.contains(step) {
            return Err(Error::invalid_graph(format!(
                "job '{name}' reads outputs of unknown step '{step}'"
            )));
        }
    }
    Ok(())
}

fn check_metadata_paths(
    name: &str,
    text: &str,
    metadata_ref: &Regex,
    plan: &MetadataPlan,
) -> Result<()> {
    for caps in metadata_ref.captures_iter(text) {
        let path: Vec<&str> = caps[1].split('.').filter(|s| !s.is_empty()).collect();
        if !plan.provides(&path) {
            return Err(Error::invalid_graph(format!(
                "job '{name}' reads metadata field '{}' the build does not produce",
                path.join(".")
            )));
        }
    }
    Ok(())
}
