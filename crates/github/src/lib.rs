//! GitHub Actions support for cigen.
//!
//! - [`workflow::WorkflowGenerator`] assembles and renders the CI workflow
//! - [`workflow::expr`] builds the `${{ ... }}` expressions jobs use to read
//!   artifact metadata

#![warn(missing_docs)]

pub mod workflow;

pub use workflow::WorkflowGenerator;
