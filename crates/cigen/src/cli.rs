use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// I/O or other runtime error exit code
pub const EXIT_IO: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(cigen::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Filesystem error (exit code 3)
    #[error("I/O error: {message}")]
    #[diagnostic(code(cigen::cli::io))]
    Io {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(cigen::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an I/O error for an operation on `path`
    #[must_use]
    pub fn io(operation: &str, path: &std::path::Path, source: &io::Error) -> Self {
        Self::Io {
            message: format!("{operation} {} failed: {source}", path.display()),
            help: Some("Check file permissions and ensure the path exists".to_string()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }
}

/// Convert `cigen_core::Error` to a `CliError`.
///
/// Configuration problems keep their diagnostic help; graph and serialization
/// failures are internal and map to `Other`.
impl From<cigen_core::Error> for CliError {
    fn from(err: cigen_core::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        if err.is_configuration() {
            Self::Config {
                message: err.to_string(),
                help,
            }
        } else {
            Self::Other {
                message: err.to_string(),
                help,
            }
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Io { .. } | CliError::Other { .. } => EXIT_IO,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Io { .. } => "io",
                CliError::Other { .. } => "other",
            },
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Main CLI entry point for cigen.
///
/// Generates a GitHub Actions workflow that builds a Node.js package and/or a
/// container image across an OS x architecture x Node.js matrix, and publishes
/// them on version tags.
#[derive(Parser, Debug)]
#[command(name = "cigen")]
#[command(about = "Generate a GitHub Actions build-and-publish workflow")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        env = "CIGEN_LOG",
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Emit JSON envelope for results and errors.
    #[arg(long, global = true, help = "Emit JSON envelope for results and errors")]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the workflow to stdout.
    #[command(about = "Print the workflow to stdout")]
    Render {
        /// Workflow options.
        #[command(flatten)]
        args: RenderArgs,
    },
    /// Write the workflow into the repository.
    #[command(about = "Write the workflow into the repository")]
    Install {
        /// Workflow options.
        #[command(flatten)]
        args: RenderArgs,

        /// Destination path, relative to the project directory
        /// (default: `.github/workflows/ci.yaml`).
        #[arg(long, short = 'o', env = "CIGEN_OUTPUT")]
        output: Option<PathBuf>,

        /// Overwrite an existing file without asking.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Options shared by `render` and `install`.
///
/// Unset options fall back to defaults derived from the project directory:
/// `package.json` enables the Node.js package and `Dockerfile` the image.
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Project directory to inspect.
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Operating systems, comma-separated (linux, mac, windows or runner labels).
    #[arg(long, value_name = "LIST")]
    pub build_target_os: Option<String>,

    /// CPU architectures, comma-separated.
    #[arg(long, value_name = "LIST")]
    pub build_target_arch: Option<String>,

    /// Node.js versions, comma-separated; empty disables the dimension.
    #[arg(long, value_name = "LIST")]
    pub build_target_node: Option<String>,

    /// Build, test, pack and upload the Node.js package.
    #[arg(long, value_name = "BOOL")]
    pub build_nodepkg: Option<String>,

    /// Build and upload the container image.
    #[arg(long, value_name = "BOOL")]
    pub build_image: Option<String>,

    /// Package registries, comma-separated (`hosted`, `public`, optional `:public`).
    #[arg(long, value_name = "LIST")]
    pub publish_nodepkg: Option<String>,

    /// Image registries, comma-separated (`hosted`).
    #[arg(long, value_name = "LIST")]
    pub publish_image: Option<String>,

    /// Release channels, comma-separated (`hosted`).
    #[arg(long, value_name = "LIST")]
    pub publish_release: Option<String>,

    /// Attach the Node.js package to releases.
    #[arg(long, value_name = "BOOL")]
    pub publish_release_nodepkg: Option<String>,

    /// Attach the image tarball to releases.
    #[arg(long, value_name = "BOOL")]
    pub publish_release_image: Option<String>,
}

/// Parse command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["cigen", "render"]).unwrap();
        assert_eq!(cli.level, LogLevel::Warn);
        assert_eq!(cli.log_format, TracingFormat::Compact);
        assert!(!cli.json);
        let Commands::Render { args } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.project_dir, PathBuf::from("."));
        assert!(args.build_target_os.is_none());
    }

    #[test]
    fn test_install_arguments() {
        let cli = Cli::try_parse_from([
            "cigen",
            "install",
            "-o",
            "ci/workflow.yaml",
            "--yes",
            "--build-target-os",
            "linux,mac",
            "--publish-nodepkg",
            "hosted:public",
        ])
        .unwrap();
        let Commands::Install { args, output, yes } = cli.command else {
            panic!("expected install");
        };
        assert_eq!(output, Some(PathBuf::from("ci/workflow.yaml")));
        assert!(yes);
        assert_eq!(args.build_target_os.as_deref(), Some("linux,mac"));
        assert_eq!(args.publish_nodepkg.as_deref(), Some("hosted:public"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cigen", "render", "--json", "-L", "debug"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.level, LogLevel::Debug);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["cigen"]).is_err());
    }

    #[test]
    fn test_core_error_mapping() {
        let err = CliError::from(cigen_core::Error::unrecognized_os("plan9"));
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(exit_code_for(&err), EXIT_CLI);
        assert!(err.to_string().contains("plan9"));

        let err = CliError::from(cigen_core::Error::invalid_graph("cycle"));
        assert!(matches!(err, CliError::Other { .. }));
        assert_eq!(exit_code_for(&err), EXIT_IO);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(EXIT_OK, 0);
        assert_eq!(EXIT_CLI, 2);
        assert_eq!(EXIT_IO, 3);
        let err = CliError::io(
            "write",
            std::path::Path::new("/x"),
            &io::Error::other("denied"),
        );
        assert_eq!(exit_code_for(&err), EXIT_IO);
    }

    #[test]
    fn test_envelopes() {
        let ok = serde_json::to_value(OkEnvelope::new(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "ok", "data": 1}));
        let err = serde_json::to_value(ErrorEnvelope::new("bad")).unwrap();
        assert_eq!(err, serde_json::json!({"status": "error", "error": "bad"}));
    }
}
