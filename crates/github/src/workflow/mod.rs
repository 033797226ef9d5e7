//! GitHub Actions Workflow Generator
//!
//! Assembles the CI workflow: one matrix `build` job that produces artifacts
//! and one tag-gated job per publish target that consumes them.
//!
//! # Example
//!
//! ```ignore
//! use cigen_github::workflow::WorkflowGenerator;
//!
//! let yaml = WorkflowGenerator::new().render(&config)?;
//! std::fs::write(".github/workflows/ci.yaml", yaml)?;
//! ```

pub mod build;
pub mod emitter;
pub mod expr;
pub mod publish;
pub mod schema;
pub mod script;
pub mod validate;

pub use emitter::{GENERATION_HEADER, WorkflowGenerator};
pub use expr::{Downstream, MetadataExpr, PathExpr, SameJob};
pub use schema::*;
