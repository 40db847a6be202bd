//! Invocation of the external SUMO tools (`netconvert`, `randomTrips.py`)

use anyhow::{Context, Result};
use log::{info, warn};
use std::ffi::OsStr;
use std::process::{Command, ExitStatus};

/// Runs a tool to completion and forwards whatever it printed to the log.
///
/// A tool that cannot be started is an error. A failure status is only
/// reported here; callers check that the tool wrote its output.
pub fn run_tool(command: &mut Command) -> Result<ExitStatus> {
    let program = command.get_program().to_string_lossy().into_owned();
    info!("Running {}", describe(command));

    let output = command
        .output()
        .with_context(|| format!("Failed to start {}", program))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        info!("{}: {}", program, stdout.trim_end());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        warn!("{}: {}", program, stderr.trim_end());
    }
    if !output.status.success() {
        warn!("{} exited with {}", program, output.status);
    }

    Ok(output.status)
}

/// Renders a command line for logging
pub fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}
