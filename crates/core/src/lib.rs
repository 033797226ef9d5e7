//! Core types for cigen.
//!
//! This crate holds everything about a workflow that does not depend on the
//! CI provider's document format:
//! - [`config`]: build targets, artifact kinds and publish targets
//! - [`platform`]: OS name / runner label / platform tag resolution
//! - [`matrix`]: expansion of a build target into matrix cells
//! - [`manifest`]: the project package manifest
//! - [`metadata`]: the per-cell artifact metadata record and its field names
//! - [`emitter`]: the trait provider crates implement to render a workflow

pub mod config;
pub mod emitter;
pub mod error;
pub mod manifest;
pub mod matrix;
pub mod metadata;
pub mod platform;

pub use config::{
    ArtifactKind, ArtifactKinds, BuildConfig, BuildTarget, GeneratorConfig, ImageRegistry,
    PackageRegistry, PublishConfig, PublishTarget, Registry, ReleaseChannel,
};
pub use emitter::Emitter;
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use matrix::{MatrixCell, expand};
pub use metadata::MetadataPlan;
pub use platform::{Platform, resolve_platform_tag, resolve_runner};
