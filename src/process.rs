//! Running external command-line tools

use crate::error::{ReleasePrError, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run `program` with `args` in `dir` and return its stdout.
///
/// A spawn failure or non-zero exit becomes [ReleasePrError::External]
/// carrying the tool's stderr.
pub fn run_tool(program: &str, args: &[&str], dir: &Path) -> Result<String> {
    run_command(program, Command::new(program).args(args).current_dir(dir))
}

/// Run a prepared command, labelling errors with `tool`
pub fn run_command(tool: &str, command: &mut Command) -> Result<String> {
    debug!(tool, command = ?command, "running external command");

    let output = command
        .output()
        .map_err(|e| ReleasePrError::external(tool, format!("could not be started: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReleasePrError::external(
            tool,
            format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
