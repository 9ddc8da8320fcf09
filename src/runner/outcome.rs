use crate::invoke::classify::ClassifiedLines;

/// Everything observed during one [`Runner::run`](crate::Runner::run).
///
/// Built once when the run finishes and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub(crate) cmdline: Vec<String>,
    pub(crate) return_code: Option<i32>,
    pub(crate) stdout: Vec<String>,
    pub(crate) stderr: Vec<String>,
    pub(crate) classified: ClassifiedLines,
    pub(crate) script: Vec<String>,
    pub(crate) success: bool,
    pub(crate) complete: bool,
}

impl RunOutcome {
    /// Program and arguments exactly as launched.
    pub fn cmdline(&self) -> &[String] {
        &self.cmdline
    }

    /// Exit code, `None` if the process was killed by a signal.
    pub fn return_code(&self) -> Option<i32> {
        self.return_code
    }

    /// Every line OpenSCAD wrote to stdout.
    pub fn stdout(&self) -> &[String] {
        &self.stdout
    }

    /// Every line OpenSCAD wrote to stderr, classified or not.
    pub fn stderr(&self) -> &[String] {
        &self.stderr
    }

    /// `ECHO:` lines.
    pub fn echos(&self) -> &[String] {
        &self.classified.echos
    }

    /// `WARNING:` lines.
    pub fn warnings(&self) -> &[String] {
        &self.classified.warnings
    }

    /// `ERROR:` and `TRACE:` lines.
    pub fn errors(&self) -> &[String] {
        &self.classified.errors
    }

    /// Lines of the script file, re-read after the run.
    pub fn script(&self) -> &[String] {
        &self.script
    }

    /// Exit code zero, no errors, and no warnings when they are fatal.
    pub fn good(&self) -> bool {
        self.success
    }

    /// The run finished, whether or not it succeeded.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// A run succeeds when OpenSCAD exits with zero, reports no errors, and, under hard warnings,
/// reports no warnings either.
pub(crate) fn is_success(
    return_code: Option<i32>,
    classified: &ClassifiedLines,
    hard_warnings: bool,
) -> bool {
    return_code == Some(0)
        && classified.errors.is_empty()
        && (!hard_warnings || classified.warnings.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/runner/outcome.rs"]
mod tests;
