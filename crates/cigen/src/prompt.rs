//! Interactive confirmation.

use crate::cli::CliError;
use std::io::{self, BufRead, IsTerminal, Write};

/// Ask a yes/no question on stderr; an empty answer takes `default`.
///
/// `assume_yes` skips the prompt. Without a terminal on stdin and stderr the
/// question cannot be asked and an error is returned instead.
///
/// # Errors
///
/// Returns a configuration error in non-interactive mode, or an I/O error if
/// the terminal cannot be read.
pub fn confirm(message: &str, default: bool, assume_yes: bool) -> Result<bool, CliError> {
    if assume_yes {
        return Ok(true);
    }

    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
        return Err(CliError::config_with_help(
            "Cannot prompt for confirmation in non-interactive mode",
            "Pass --yes to proceed",
        ));
    }

    let mut stderr = io::stderr();
    let hint = if default { "Y/n" } else { "y/N" };
    write!(stderr, "? {message} ({hint}): ")
        .and_then(|()| stderr.flush())
        .map_err(|e| CliError::other(format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|e| CliError::other(format!("Failed to read answer: {e}")))?;

    Ok(parse_answer(&input, default))
}

/// Interpret a typed answer.
#[must_use]
pub fn parse_answer(input: &str, default: bool) -> bool {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}
