//! Outstanding-work accounting shared by the queue and its worker.
//!
//! `outstanding` is incremented on submit and decremented by the worker after the
//! job's follow-up action has been pushed, so `outstanding == 0` implies every
//! follow-up is already in the outbound channel.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct WorkTracker {
    outstanding: AtomicUsize,
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl WorkTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Undo `begin` for a job that never reached the worker.
    pub(crate) fn abandon(&self) {
        self.submitted.fetch_sub(1, Ordering::Relaxed);
        self.release();
    }

    pub(crate) fn finish(&self, success: bool) {
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.release();
    }

    fn release(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            // ロックを取ってから通知（wait 側の判定と競合させない）
            let _guard = self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.idle.notify_all();
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub(crate) fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Wait until nothing is outstanding or `timeout` passes. Returns `true` when idle.
    pub(crate) fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let guard = self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (_guard, _result) = self
            .idle
            .wait_timeout_while(guard, timeout, |_| self.outstanding() > 0)
            .unwrap_or_else(PoisonError::into_inner);
        self.outstanding() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn counts_follow_begin_and_finish() {
        let tracker = WorkTracker::new();
        tracker.begin();
        tracker.begin();
        tracker.begin();
        tracker.finish(true);
        tracker.finish(false);

        assert_eq!(tracker.outstanding(), 1);
        assert_eq!(tracker.submitted(), 3);
        assert_eq!(tracker.succeeded(), 1);
        assert_eq!(tracker.failed(), 1);
    }

    #[test]
    fn abandon_rolls_back_submission() {
        let tracker = WorkTracker::new();
        tracker.begin();
        tracker.abandon();
        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(tracker.submitted(), 0);
    }

    #[test]
    fn wait_idle_returns_immediately_when_idle() {
        let tracker = WorkTracker::new();
        let start = Instant::now();
        assert!(tracker.wait_idle_timeout(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn wait_idle_times_out_while_busy() {
        let tracker = WorkTracker::new();
        tracker.begin();
        assert!(!tracker.wait_idle_timeout(Duration::from_millis(50)));
    }

    #[test]
    fn finish_wakes_waiter() {
        let tracker = Arc::new(WorkTracker::new());
        tracker.begin();

        let finisher = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                tracker.finish(true);
            })
        };

        assert!(tracker.wait_idle_timeout(Duration::from_secs(5)));
        finisher.join().unwrap();
    }
}
