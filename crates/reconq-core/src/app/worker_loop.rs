//! WorkerLoop - ジョブ実行ループ
//!
//! # フロー
//! 1. inbound から bounded wait で 1 件取得（timeout 時に stop を確認）
//! 2. compute を実行（経過時間を計測、panic は catch_unwind で隔離）
//! 3. 成功でも失敗でも FollowUpAction を必ず 1 件 outbound に push
//! 4. outstanding カウンタを減らす

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

use super::tracker::WorkTracker;
use crate::domain::errors::ComputeError;
use crate::domain::job::{ComputeFn, JobTicket};
use crate::domain::outcome::JobOutcome;
use crate::domain::FollowUpAction;
use crate::ports::Clock;

/// A job after submission: ticket attached, label split out.
pub(crate) struct SubmittedJob<H, S> {
    pub(crate) ticket: JobTicket,
    pub(crate) target: H,
    pub(crate) compute: ComputeFn<S>,
}

/// The single background executor.
///
/// Owned by the worker thread; the queue keeps only the sending half of the
/// inbound channel and the receiving half of the outbound one.
pub(crate) struct WorkerLoop<H, S> {
    inbound: Receiver<SubmittedJob<H, S>>,
    outbound: Sender<FollowUpAction<H, S>>,
    tracker: Arc<WorkTracker>,
    stop: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl<H, S> WorkerLoop<H, S> {
    pub(crate) fn new(
        inbound: Receiver<SubmittedJob<H, S>>,
        outbound: Sender<FollowUpAction<H, S>>,
        tracker: Arc<WorkTracker>,
        stop: Arc<AtomicBool>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            inbound,
            outbound,
            tracker,
            stop,
            clock,
            poll_interval,
        }
    }

    pub(crate) fn run(self) {
        debug!("worker loop started");
        loop {
            match self.inbound.recv_timeout(self.poll_interval) {
                Ok(job) => {
                    let action = self.execute(job);
                    let success = action.outcome().is_success();
                    if self.outbound.send(action).is_err() {
                        warn!("follow-up channel closed, dropping result");
                    }
                    self.tracker.finish(success);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.stop.load(Ordering::Acquire) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("worker loop exited");
    }

    fn execute(&self, job: SubmittedJob<H, S>) -> FollowUpAction<H, S> {
        let SubmittedJob {
            ticket,
            target,
            compute,
        } = job;

        let tic = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(compute))
            .unwrap_or_else(|payload| Err(ComputeError::Panicked(panic_message(payload.as_ref()))));
        let elapsed = tic.elapsed();
        let finished_at = self.clock.now();

        match result {
            Ok(output) => {
                let outcome = JobOutcome::succeeded(output.result, elapsed);
                info!(
                    job_id = %ticket.job_id,
                    label = %ticket.label,
                    elapsed_ms = outcome.elapsed_ms,
                    code = output.result,
                    "reconstruction finished in {:.4} seconds",
                    elapsed.as_secs_f64(),
                );
                FollowUpAction::assign(ticket, target, output.state, outcome, finished_at)
            }
            Err(err) => {
                let outcome = JobOutcome::from_error(&err, elapsed);
                error!(
                    job_id = %ticket.job_id,
                    label = %ticket.label,
                    elapsed_ms = outcome.elapsed_ms,
                    kind = ?outcome.kind,
                    error = %err,
                    "reconstructor error",
                );
                FollowUpAction::no_op(ticket, target, outcome, finished_at)
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
