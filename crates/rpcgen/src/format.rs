//! Formatting generated output with the target's external formatter.
//!
//! Formatting is best effort: a missing or failing formatter leaves the file
//! as generated and logs a warning.

use std::path::Path;
use std::process::Command;

use crate::codegen::Target;
use crate::diagnostic::GeneratorError;

/// The formatter invocation for `target`, with `file` as its last argument.
fn command_for(target: Target, formatter: Option<&Path>, file: &Path) -> Command {
    let (program, args): (&std::ffi::OsStr, &[&str]) = match target {
        Target::Rust => (
            formatter.map(Path::as_os_str).unwrap_or("rustfmt".as_ref()),
            &["--edition", "2021"],
        ),
        Target::TypeScript => (
            formatter.map(Path::as_os_str).unwrap_or("prettier".as_ref()),
            &["--write"],
        ),
    };
    let mut command = Command::new(program);
    command.args(args).arg(file);
    command
}

fn run(target: Target, formatter: Option<&Path>, file: &Path) -> Result<(), GeneratorError> {
    let output = command_for(target, formatter, file)
        .output()
        .map_err(|e| GeneratorError::FormatFailed {
            message: e.to_string(),
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(GeneratorError::FormatFailed {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Formats `file` in place. Returns whether the formatter succeeded.
pub fn format_file(target: Target, formatter: Option<&Path>, file: &Path) -> bool {
    match run(target, formatter, file) {
        Ok(()) => {
            tracing::debug!(file = %file.display(), "formatted generated client");
            true
        }
        Err(err) => {
            tracing::warn!(
                file = %file.display(),
                error = %err,
                "formatter failed, output left unformatted"
            );
            false
        }
    }
}
