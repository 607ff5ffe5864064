//! Reconstructor port - 再構成アルゴリズムの抽象化
//!
//! The numerical backend is an external collaborator. The queue only needs a name
//! for logs and a pure function from an input snapshot to a new entity state.

use crate::domain::errors::ComputeError;

/// What a reconstructor hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructOutput<S> {
    /// Replacement state for the target entity.
    pub state: S,

    /// Backend status code; logged with the elapsed time.
    pub result: i32,
}

impl<S> ReconstructOutput<S> {
    pub fn new(state: S, result: i32) -> Self {
        Self { state, result }
    }

    pub fn ok(state: S) -> Self {
        Self::new(state, 0)
    }
}

/// A reconstruction algorithm.
///
/// `reconstruct` runs on the worker thread. It receives an owned snapshot `I`
/// captured at submission time and must not reach back into shared state; all
/// mutation happens when the queue drains on the control thread.
pub trait Reconstructor<I, S>: Send + Sync {
    fn name(&self) -> &str;

    fn reconstruct(&self, input: I) -> Result<ReconstructOutput<S>, ComputeError>;
}
