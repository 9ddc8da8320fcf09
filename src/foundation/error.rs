/// Convenience result type used across the runner.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors raised by the runner itself.
///
/// A failed OpenSCAD run is not an error: exit codes and `ERROR:` lines are reported through
/// [`RunOutcome`](crate::RunOutcome). These variants cover what prevents a run from happening or
/// from being post-processed.
#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    /// Configuration that cannot be turned into a valid invocation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The OpenSCAD executable could not be found or started.
    #[error("launch error: {0}")]
    Launch(String),

    /// Image resizing, GIF assembly, or GIF optimization failed after a successful run.
    #[error("post-processing error: {0}")]
    PostProcess(String),

    /// Errors when reading configuration documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunnerError {
    /// Build a [`RunnerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RunnerError::Launch`] value.
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Build a [`RunnerError::PostProcess`] value.
    pub fn post_process(msg: impl Into<String>) -> Self {
        Self::PostProcess(msg.into())
    }

    /// Build a [`RunnerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
