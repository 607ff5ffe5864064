//! Error taxonomy.
//!
//! - `ComputeError`: raised by a compute function on the worker. Isolated there:
//!   it is logged and recorded on the job's outcome, never returned to the caller.
//! - `ApplyError`: a follow-up action could not be applied on the control thread.
//! - `MisuseError`: the queue lifecycle was driven out of order.
//! - `QueueError`: everything the control thread can observe.

use thiserror::Error;

use super::ids::JobId;
use super::state::QueueState;

/// Failure of a job's compute function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    #[error("reconstruction failed: {0}")]
    Failed(String),

    #[error("invalid reconstruction input: {0}")]
    InvalidInput(String),

    #[error("reconstruction panicked: {0}")]
    Panicked(String),
}

impl ComputeError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Failure while applying a follow-up action to its target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("target {target} for {job_id} no longer exists")]
    TargetNotFound { job_id: JobId, target: String },
}

/// Lifecycle operation called in the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MisuseError {
    #[error("queue has not been started")]
    NotStarted,

    #[error("queue was already started (state={0:?})")]
    AlreadyStarted(QueueState),

    #[error("queue is stopping")]
    Stopping,

    #[error("queue was already stopped")]
    AlreadyStopped,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Misuse(#[from] MisuseError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("worker thread lost: {0}")]
    WorkerLost(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn misuse_converts_into_queue_error() {
        let err: QueueError = MisuseError::NotStarted.into();
        assert!(matches!(err, QueueError::Misuse(MisuseError::NotStarted)));
        assert_eq!(err.to_string(), "queue has not been started");
    }

    #[test]
    fn apply_error_names_job_and_target() {
        let job_id = JobId::from_ulid(Ulid::new());
        let err = ApplyError::TargetNotFound {
            job_id,
            target: "\"probe\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains(&job_id.to_string()));
        assert!(msg.contains("probe"));
    }
}
