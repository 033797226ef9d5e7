//! CI workflow emitter trait.
//!
//! An emitter turns a [`GeneratorConfig`] into one provider-native document
//! (for GitHub Actions, a workflow YAML file).

use crate::config::GeneratorConfig;
use crate::error::Result;

/// Trait for CI workflow emitters.
///
/// Implementations are pure: the same configuration always yields the same
/// document, and a configuration error yields no document at all.
pub trait Emitter: Send + Sync {
    /// Emit the workflow document for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the document
    /// cannot be serialized.
    fn emit(&self, config: &GeneratorConfig) -> Result<String>;

    /// Path, relative to the project root, the document is installed to.
    fn default_output_path(&self) -> &'static str;
}
