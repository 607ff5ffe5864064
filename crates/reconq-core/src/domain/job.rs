//! Job: one unit of reconstruction work bound to a target handle.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ComputeError;
use super::ids::JobId;
use crate::ports::{ReconstructOutput, Reconstructor};

/// Boxed compute function executed once on the worker thread.
pub type ComputeFn<S> = Box<dyn FnOnce() -> Result<ReconstructOutput<S>, ComputeError> + Send + 'static>;

/// A job as built by the caller.
///
/// The compute closure owns its inputs (a snapshot); the target is only a handle
/// and is resolved again when the result is drained.
pub struct Job<H, S> {
    label: String,
    target: H,
    compute: ComputeFn<S>,
}

impl<H, S> Job<H, S> {
    pub fn new<F>(label: impl Into<String>, target: H, compute: F) -> Self
    where
        F: FnOnce() -> Result<ReconstructOutput<S>, ComputeError> + Send + 'static,
    {
        Self {
            label: label.into(),
            target,
            compute: Box::new(compute),
        }
    }

    /// Run `reconstructor` against `input` and write the result back to `target`.
    pub fn from_reconstructor<I>(
        reconstructor: Arc<dyn Reconstructor<I, S>>,
        input: I,
        target: H,
    ) -> Self
    where
        I: Send + 'static,
        S: 'static,
    {
        let label = reconstructor.name().to_string();
        Self::new(label, target, move || reconstructor.reconstruct(input))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> &H {
        &self.target
    }

    pub(crate) fn into_parts(self) -> (String, H, ComputeFn<S>) {
        (self.label, self.target, self.compute)
    }
}

impl<H: fmt::Debug, S> fmt::Debug for Job<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("label", &self.label)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Bookkeeping the queue attaches to a job at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTicket {
    pub job_id: JobId,
    pub label: String,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Reconstructor<u32, u32> for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn reconstruct(&self, input: u32) -> Result<ReconstructOutput<u32>, ComputeError> {
            Ok(ReconstructOutput::new(input + 1, 3))
        }
    }

    #[test]
    fn job_from_reconstructor_uses_its_name() {
        let job: Job<&str, u32> = Job::from_reconstructor(Arc::new(Fixed), 41_u32, "object");
        assert_eq!(job.label(), "fixed");
        assert_eq!(*job.target(), "object");

        let (_, _, compute) = job.into_parts();
        let out = compute().unwrap();
        assert_eq!(out.state, 42);
        assert_eq!(out.result, 3);
    }

    #[test]
    fn job_debug_hides_closure() {
        let job: Job<u8, ()> = Job::new("noop", 7, || Ok(ReconstructOutput::ok(())));
        let s = format!("{job:?}");
        assert!(s.contains("noop"));
        assert!(s.contains('7'));
    }
}
