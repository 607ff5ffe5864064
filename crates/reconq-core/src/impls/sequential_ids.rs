//! Deterministic job IDs for tests and reproducible runs.

use std::sync::atomic::{AtomicU64, Ordering};

use ulid::Ulid;

use crate::domain::ids::JobId;
use crate::ports::IdGenerator;

/// Hands out `job-00000000000000000000000001`, `...02`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ID the `n`-th call (1-based) returns.
    pub fn id_for(n: u64) -> JobId {
        JobId::from_ulid(Ulid::from_parts(0, u128::from(n)))
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_job_id(&self) -> JobId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Self::id_for(n)
    }
}
