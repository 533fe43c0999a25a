use thiserror::Error;

/// Outcome of a stage run that did not produce a result.
///
/// `Cancelled` is not a failure: the run was dropped on request and the
/// owner decides whether to schedule it again. Everything else is passed
/// through untouched from the locator or image I/O.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task cancelled")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
