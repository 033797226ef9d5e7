//! cigen - GitHub Actions workflow generator
//!
//! Inspects a project directory (`package.json`, `Dockerfile`), resolves the
//! build and publish options against it, and renders a workflow that builds
//! a Node.js package and/or a container image across an OS x architecture x
//! Node.js matrix and publishes them on version tags.
//!
//! The workflow model itself lives in `cigen-core` and `cigen-github`; this
//! crate holds the command-line surface around them.

// CLI output goes to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

/// CLI argument parsing, error types and exit codes.
pub mod cli;
/// Command implementations (render, install).
pub mod commands;
pub mod project;
pub mod prompt;
/// Tracing subscriber setup.
pub mod tracing;
