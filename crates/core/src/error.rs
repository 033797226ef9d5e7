//! Error types for workflow configuration and generation.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for cigen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating configuration or assembling a workflow.
///
/// Every variant is fatal: generation stops before any document is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// An OS identifier is neither a logical name nor a known runner label.
    #[error("Unrecognized OS: {os}")]
    #[diagnostic(
        code(cigen::config::unrecognized_os),
        help("Use linux, mac, windows or a GitHub-hosted runner label (ubuntu-*, macos-*, windows-*)")
    )]
    UnrecognizedOs {
        /// The offending identifier
        os: String,
    },

    /// A build target list that must not be empty was empty.
    #[error("Build target has no {field}")]
    #[diagnostic(
        code(cigen::config::empty_target),
        help("Pass at least one value with --build-target-{field}")
    )]
    EmptyTarget {
        /// Which list was empty ("os" or "arch")
        field: &'static str,
    },

    /// A registry name is not known for this publish kind.
    #[error("Invalid {kind} registry: {registry}")]
    #[diagnostic(code(cigen::config::invalid_registry), help("Valid registries: {valid}"))]
    InvalidRegistry {
        /// Publish kind the registry was given for
        kind: &'static str,
        /// The offending registry token
        registry: String,
        /// Accepted values, for the help text
        valid: &'static str,
    },

    /// A registry flag (the part after `:`) is not supported.
    #[error("Invalid {kind} registry flag: {flag}")]
    #[diagnostic(
        code(cigen::config::invalid_registry_flag),
        help("The only supported flag is 'public' (e.g. hosted:public)")
    )]
    InvalidRegistryFlag {
        /// Publish kind the flag was given for
        kind: &'static str,
        /// The offending flag token
        flag: String,
    },

    /// A boolean option could not be parsed.
    #[error("Invalid boolean value: {value}")]
    #[diagnostic(code(cigen::config::invalid_bool), help("Use true, false, 1 or 0"))]
    InvalidBool {
        /// The offending value
        value: String,
    },

    /// A language package was requested but no package manifest was supplied.
    #[error("Building a Node.js package requires a package manifest")]
    #[diagnostic(
        code(cigen::config::manifest_required),
        help("Run from a directory containing package.json, or pass --build-nodepkg false")
    )]
    ManifestRequired,

    /// A publish target consumes an artifact the build does not produce.
    #[error("Publishing requires building the {kind}")]
    #[diagnostic(
        code(cigen::config::artifact_not_built),
        help("Enable the artifact with --build-nodepkg / --build-image, or drop the publish target")
    )]
    ArtifactNotBuilt {
        /// Label of the missing artifact kind
        kind: &'static str,
    },

    /// The package manifest could not be read as JSON.
    #[error("Invalid package manifest: {message}")]
    #[diagnostic(code(cigen::config::invalid_manifest))]
    InvalidManifest {
        /// Parser message
        message: String,
    },

    /// The package name cannot yield an owner scope.
    #[error("Package name '{name}' is not scoped")]
    #[diagnostic(
        code(cigen::config::invalid_package_name),
        help("Package names must look like @owner/name to be published")
    )]
    InvalidPackageName {
        /// The offending package name
        name: String,
    },

    /// Two publish targets map onto the same job name.
    #[error("Publish job '{job}' is configured more than once")]
    #[diagnostic(
        code(cigen::config::duplicate_job),
        help("Each registry may appear once per publish kind")
    )]
    DuplicateJob {
        /// The clashing job name
        job: String,
    },

    /// The assembled job graph violates a structural invariant.
    #[error("Invalid job graph: {message}")]
    #[diagnostic(code(cigen::workflow::invalid_graph))]
    InvalidGraph {
        /// What is wrong with the graph
        message: String,
    },

    /// The workflow could not be serialized.
    #[error("Serialization failed: {message}")]
    #[diagnostic(code(cigen::workflow::serialization))]
    Serialization {
        /// Serializer message
        message: String,
    },
}

impl Error {
    /// Create an unrecognized-OS error.
    #[must_use]
    pub fn unrecognized_os(os: impl Into<String>) -> Self {
        Self::UnrecognizedOs { os: os.into() }
    }

    /// Create a graph-invariant error.
    #[must_use]
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph {
            message: message.into(),
        }
    }

    /// Whether this error stems from user configuration rather than from the generator.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::InvalidGraph { .. } | Self::Serialization { .. })
    }
}
