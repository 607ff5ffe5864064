//! Status - キューの状態スナップショット
//!
//! Advisory only: values can change as soon as they are read.

use serde::{Deserialize, Serialize};

use crate::domain::QueueState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub state: QueueState,

    /// Jobs waiting in the inbound FIFO (not started).
    pub queued: usize,

    /// Jobs submitted but not yet finished (queued + running).
    pub outstanding: usize,

    /// Follow-up actions ready to drain.
    pub pending_follow_ups: usize,

    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl QueueStatus {
    pub fn is_busy(&self) -> bool {
        self.outstanding > 0
    }

    /// Is a job executing right now?
    pub fn running(&self) -> bool {
        self.outstanding > self.queued
    }
}
