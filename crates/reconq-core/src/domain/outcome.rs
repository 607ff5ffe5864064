//! Outcome model: what happened when a job ran, and what draining it did.
//!
//! Both types are plain data so a UI (or the CLI) can render or serialize them
//! without touching the queue.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ComputeError;
use super::ids::JobId;

/// Classification of one job execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Succeeded,
    Failed,
    Panicked,
}

/// Result of executing a job on the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub kind: OutcomeKind,

    /// Status code reported by the reconstructor (success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<i32>,

    pub elapsed_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JobOutcome {
    pub fn succeeded(result_code: i32, elapsed: Duration) -> Self {
        Self {
            kind: OutcomeKind::Succeeded,
            result_code: Some(result_code),
            elapsed_ms: duration_ms(elapsed),
            reason: None,
        }
    }

    pub fn from_error(error: &ComputeError, elapsed: Duration) -> Self {
        let kind = match error {
            ComputeError::Panicked(_) => OutcomeKind::Panicked,
            ComputeError::Failed(_) | ComputeError::InvalidInput(_) => OutcomeKind::Failed,
        };
        Self {
            kind,
            result_code: None,
            elapsed_ms: duration_ms(elapsed),
            reason: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Succeeded
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// One entry per follow-up action applied by a drain, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: JobId,
    pub label: String,

    /// Debug rendering of the target handle.
    pub target: String,

    pub outcome: JobOutcome,

    /// Whether the target entity was modified.
    pub applied: bool,

    pub submitted_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
