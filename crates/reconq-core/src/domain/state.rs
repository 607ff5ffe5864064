//! Queue lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of an `ExecutionQueue`.
///
/// Transitions:
/// - Created -> Started (`start`)
/// - Started -> Stopping -> Stopped (`stop`)
///
/// There is no way back; a stopped queue is not restartable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueState {
    Created,
    Started,
    Stopping,
    Stopped,
}

impl QueueState {
    /// Is the worker thread (possibly) alive?
    pub fn has_worker(self) -> bool {
        matches!(self, QueueState::Started | QueueState::Stopping)
    }
}
