use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::foundation::error::{RunnerError, RunnerResult};

/// Raw result of one finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

/// Starts a program, waits for it, and captures its output.
///
/// The runner only ever talks to OpenSCAD through this trait, so tests can substitute a scripted
/// implementation that writes image files and returns canned diagnostics.
pub trait Launcher {
    /// Run `program` with `args` to completion. No shell is involved.
    fn launch(&self, program: &Path, args: &[String]) -> RunnerResult<ProcessOutput>;
}

/// [`Launcher`] backed by [`std::process::Command`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> RunnerResult<ProcessOutput> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RunnerError::launch(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    program.display()
                ))
            })?;

        // stdin is closed by `wait_with_output` before waiting; OpenSCAD never reads it.
        let output = child.wait_with_output().map_err(|e| {
            RunnerError::launch(format!(
                "failed to wait for '{}' to finish: {e}",
                program.display()
            ))
        })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/invoke/launcher.rs"]
mod tests;
