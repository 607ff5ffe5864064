//! ExecutionQueue - 再構成ジョブのキュー
//!
//! The control thread submits jobs and later drains their follow-up actions; a
//! single worker thread executes jobs in submission order in between.
//!
//! ```ignore
//! let mut queue = QueueBuilder::new().build::<ProductId, Product>()?;
//! queue.start()?;
//! queue.submit(Job::from_reconstructor(epie, snapshot, product_id))?;
//! // ... on a UI timer:
//! for report in queue.drain_completed(&mut products, false)? { /* refresh views */ }
//! // ... on shutdown:
//! queue.stop(&mut products)?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use super::status::QueueStatus;
use super::tracker::WorkTracker;
use super::worker_loop::{SubmittedJob, WorkerLoop, panic_message};
use crate::config::QueueConfig;
use crate::domain::{
    FollowUpAction, Job, JobId, JobReport, JobTicket, MisuseError, QueueError, QueueState,
};
use crate::ports::{Clock, IdGenerator, TargetRepository};

/// Channel ends the worker takes ownership of at `start`.
struct WorkerChannels<H, S> {
    inbound: Receiver<SubmittedJob<H, S>>,
    outbound: Sender<FollowUpAction<H, S>>,
}

/// Single-worker execution queue.
///
/// `H` is the target handle type and `S` the state a successful job produces.
/// Targets are only ever mutated inside `drain_completed` / `stop`, i.e. on the
/// thread that owns the queue.
pub struct ExecutionQueue<H, S> {
    state: QueueState,
    config: QueueConfig,
    inbound: Option<Sender<SubmittedJob<H, S>>>,
    outbound: Receiver<FollowUpAction<H, S>>,
    worker_channels: Option<WorkerChannels<H, S>>,
    worker: Option<JoinHandle<()>>,
    tracker: Arc<WorkTracker>,
    stop_signal: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn IdGenerator>,
}

impl<H, S> ExecutionQueue<H, S> {
    pub(crate) fn with_parts(
        config: QueueConfig,
        clock: Arc<dyn Clock>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        let (in_tx, in_rx) = crossbeam_channel::unbounded();
        let (out_tx, out_rx) = crossbeam_channel::unbounded();
        Self {
            state: QueueState::Created,
            config,
            inbound: Some(in_tx),
            outbound: out_rx,
            worker_channels: Some(WorkerChannels {
                inbound: in_rx,
                outbound: out_tx,
            }),
            worker: None,
            tracker: Arc::new(WorkTracker::new()),
            stop_signal: Arc::new(AtomicBool::new(false)),
            clock,
            id_generator,
        }
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// True while any submitted job has not finished executing.
    ///
    /// Advisory (busy indicators, disabling buttons); not a synchronization point.
    pub fn is_busy(&self) -> bool {
        self.tracker.outstanding() > 0
    }

    /// Jobs waiting to start.
    pub fn queued_len(&self) -> usize {
        self.inbound.as_ref().map_or(0, Sender::len)
    }

    /// Follow-up actions ready to drain.
    pub fn pending_follow_ups(&self) -> usize {
        self.outbound.len()
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            state: self.state,
            queued: self.queued_len(),
            outstanding: self.tracker.outstanding(),
            pending_follow_ups: self.pending_follow_ups(),
            submitted: self.tracker.submitted(),
            succeeded: self.tracker.succeeded(),
            failed: self.tracker.failed(),
        }
    }

    fn ensure_started(&self) -> Result<(), MisuseError> {
        match self.state {
            QueueState::Started => Ok(()),
            QueueState::Created => Err(MisuseError::NotStarted),
            QueueState::Stopping => Err(MisuseError::Stopping),
            QueueState::Stopped => Err(MisuseError::AlreadyStopped),
        }
    }

    /// Signal the worker, close the inbound channel and join.
    fn shutdown_worker(&mut self) -> Result<(), QueueError> {
        self.stop_signal.store(true, Ordering::Release);
        self.inbound.take();
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|payload| QueueError::WorkerLost(panic_message(payload.as_ref()))),
            None => Ok(()),
        }
    }
}

impl<H, S> ExecutionQueue<H, S>
where
    H: Send + 'static,
    S: Send + 'static,
{
    /// Spawn the worker thread. Valid once, from `Created`.
    pub fn start(&mut self) -> Result<(), QueueError> {
        match self.state {
            QueueState::Created => {}
            QueueState::Stopped => return Err(MisuseError::AlreadyStopped.into()),
            state => return Err(MisuseError::AlreadyStarted(state).into()),
        }
        let Some(channels) = self.worker_channels.take() else {
            return Err(MisuseError::AlreadyStarted(self.state).into());
        };

        info!("starting reconstruction queue");
        let worker = WorkerLoop::new(
            channels.inbound,
            channels.outbound,
            Arc::clone(&self.tracker),
            Arc::clone(&self.stop_signal),
            Arc::clone(&self.clock),
            self.config.poll_interval(),
        );
        let spawned = thread::Builder::new()
            .name(self.config.worker_thread_name.clone())
            .spawn(move || worker.run());

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.state = QueueState::Started;
                info!("reconstruction queue started");
                Ok(())
            }
            Err(e) => {
                // channels went down with the closure; the queue cannot be reused
                self.state = QueueState::Stopped;
                self.inbound.take();
                Err(QueueError::WorkerLost(e.to_string()))
            }
        }
    }

    /// Enqueue a job. Never blocks.
    ///
    /// Completion is observed later through `drain_completed`; the returned id
    /// shows up on the corresponding `JobReport`.
    pub fn submit(&self, job: Job<H, S>) -> Result<JobId, QueueError> {
        self.ensure_started()?;
        let Some(inbound) = self.inbound.as_ref() else {
            return Err(MisuseError::AlreadyStopped.into());
        };

        let (label, target, compute) = job.into_parts();
        let ticket = JobTicket {
            job_id: self.id_generator.generate_job_id(),
            label,
            submitted_at: self.clock.now(),
        };
        let job_id = ticket.job_id;
        debug!(job_id = %job_id, label = %ticket.label, "job queued");

        self.tracker.begin();
        if inbound
            .send(SubmittedJob {
                ticket,
                target,
                compute,
            })
            .is_err()
        {
            self.tracker.abandon();
            return Err(QueueError::WorkerLost("inbound channel closed".to_string()));
        }
        Ok(job_id)
    }
}

impl<H: fmt::Debug, S> ExecutionQueue<H, S> {
    /// Apply every ready follow-up action to `repository`, in completion order.
    ///
    /// With `block = true` and nothing ready, waits for the next job to finish.
    /// If nothing is outstanding either, returns at once: no job could ever
    /// produce the awaited action.
    ///
    /// An `ApplyError` aborts the drain. Actions before the failing one have been
    /// applied but their reports are dropped with the error; later ones stay
    /// queued for the next drain.
    pub fn drain_completed<R>(
        &self,
        repository: &mut R,
        block: bool,
    ) -> Result<Vec<JobReport>, QueueError>
    where
        R: TargetRepository<H, S> + ?Sized,
    {
        let mut reports = Vec::new();

        if block && self.outbound.is_empty() {
            // the last action may already be drained while its counter is not yet
            // released, so re-check `outstanding` instead of waiting unbounded
            let poll_interval = self.config.poll_interval();
            while self.tracker.outstanding() > 0 {
                match self.outbound.recv_timeout(poll_interval) {
                    Ok(action) => {
                        reports.push(action.apply(repository)?);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        while let Ok(action) = self.outbound.try_recv() {
            reports.push(action.apply(repository)?);
        }

        if !reports.is_empty() {
            debug!(applied = reports.len(), "drained follow-up actions");
        }
        Ok(reports)
    }

    /// Finish every submitted job, stop the worker, then drain once.
    ///
    /// After `Ok`, no thread is running and no follow-up action is pending.
    pub fn stop<R>(&mut self, repository: &mut R) -> Result<Vec<JobReport>, QueueError>
    where
        R: TargetRepository<H, S> + ?Sized,
    {
        self.ensure_started()?;

        info!(outstanding = self.tracker.outstanding(), "finishing reconstructions");
        self.state = QueueState::Stopping;
        let poll_interval = self.config.poll_interval();
        while !self.tracker.wait_idle_timeout(poll_interval) {
            if self.worker.as_ref().is_none_or(JoinHandle::is_finished) {
                warn!(
                    outstanding = self.tracker.outstanding(),
                    "worker exited with jobs outstanding"
                );
                break;
            }
        }

        info!("stopping reconstruction queue");
        let joined = self.shutdown_worker();
        self.state = QueueState::Stopped;
        joined?;

        let reports = self.drain_completed(repository, false)?;
        info!(applied = reports.len(), "reconstruction queue stopped");
        Ok(reports)
    }
}

impl<H, S> Drop for ExecutionQueue<H, S> {
    fn drop(&mut self) {
        if !self.state.has_worker() {
            return;
        }
        warn!(
            outstanding = self.tracker.outstanding(),
            pending_follow_ups = self.outbound.len(),
            "reconstruction queue dropped without stop(); waiting for worker and discarding results"
        );
        if let Err(e) = self.shutdown_worker() {
            warn!(error = %e, "worker did not shut down cleanly");
        }
        self.state = QueueState::Stopped;
    }
}

impl<H, S> fmt::Debug for ExecutionQueue<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionQueue")
            .field("state", &self.state)
            .field("outstanding", &self.tracker.outstanding())
            .field("pending_follow_ups", &self.outbound.len())
            .finish_non_exhaustive()
    }
}
