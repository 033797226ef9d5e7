//! cigen CLI Application
//!
//! Renders the build-and-publish workflow to stdout, or installs it into the
//! project's `.github/workflows` directory.

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use cigen::cli::{self, Cli, CliError, Commands, EXIT_OK, OkEnvelope, exit_code_for, render_error};
use cigen::commands::{install, render};
use cigen::tracing::{TracingConfig, init_tracing};
use std::io::Write;

fn main() {
    #[allow(clippy::print_stderr)]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with -L debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..Default::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("Failed to initialize tracing: {e}");
    }

    let json = cli.json;
    let exit_code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            render_error(&err, json);
            exit_code_for(&err)
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Render { args } => {
            let document = render::execute(&args)?;
            if cli.json {
                print_json(&OkEnvelope::new(serde_json::json!({ "workflow": document })))
            } else {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(document.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|e| CliError::other(format!("Failed to write workflow: {e}")))
            }
        }
        Commands::Install { args, output, yes } => {
            let installed = install::execute(&args, output.as_deref(), yes)?;
            if cli.json {
                print_json(&OkEnvelope::new(installed))
            } else {
                eprintln!("Wrote {}", installed.path.display());
                Ok(())
            }
        }
    }
}

fn print_json<T: serde::Serialize>(envelope: &OkEnvelope<T>) -> Result<(), CliError> {
    let json = serde_json::to_string(envelope)
        .map_err(|e| CliError::other(format!("JSON serialization failed: {e}")))?;
    println!("{json}");
    Ok(())
}
