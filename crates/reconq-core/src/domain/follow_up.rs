//! FollowUpAction: the control-thread half of a finished job.

use std::fmt;

use chrono::{DateTime, Utc};

use super::errors::ApplyError;
use super::job::JobTicket;
use super::outcome::{JobOutcome, JobReport};
use crate::ports::{TargetEntity, TargetRepository};

/// Produced by the worker for every executed job, including failed ones.
///
/// A failed job yields an action with no update: applying it reports the
/// failure but leaves the target untouched.
pub struct FollowUpAction<H, S> {
    ticket: JobTicket,
    target: H,
    update: Option<S>,
    outcome: JobOutcome,
    finished_at: DateTime<Utc>,
}

impl<H, S> FollowUpAction<H, S> {
    pub(crate) fn assign(
        ticket: JobTicket,
        target: H,
        state: S,
        outcome: JobOutcome,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket,
            target,
            update: Some(state),
            outcome,
            finished_at,
        }
    }

    pub(crate) fn no_op(
        ticket: JobTicket,
        target: H,
        outcome: JobOutcome,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket,
            target,
            update: None,
            outcome,
            finished_at,
        }
    }

    pub fn ticket(&self) -> &JobTicket {
        &self.ticket
    }

    pub fn target(&self) -> &H {
        &self.target
    }

    pub fn outcome(&self) -> &JobOutcome {
        &self.outcome
    }

    pub fn is_no_op(&self) -> bool {
        self.update.is_none()
    }
}

impl<H: fmt::Debug, S> FollowUpAction<H, S> {
    /// Write the result into the repository.
    ///
    /// The target's display name is read before `assign` and restored after it,
    /// so results never overwrite a name the user gave the entity.
    pub fn apply<R>(self, repository: &mut R) -> Result<JobReport, ApplyError>
    where
        R: TargetRepository<H, S> + ?Sized,
    {
        let applied = match self.update {
            None => false,
            Some(state) => {
                let entity = repository.resolve(&self.target).ok_or_else(|| {
                    ApplyError::TargetNotFound {
                        job_id: self.ticket.job_id,
                        target: format!("{:?}", self.target),
                    }
                })?;
                let name = entity.name().to_owned();
                entity.assign(state);
                entity.set_name(name);
                true
            }
        };

        Ok(JobReport {
            job_id: self.ticket.job_id,
            label: self.ticket.label,
            target: format!("{:?}", self.target),
            outcome: self.outcome,
            applied,
            submitted_at: self.ticket.submitted_at,
            finished_at: self.finished_at,
        })
    }
}

impl<H: fmt::Debug, S> fmt::Debug for FollowUpAction<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowUpAction")
            .field("job_id", &self.ticket.job_id)
            .field("target", &self.target)
            .field("no_op", &self.is_no_op())
            .field("outcome", &self.outcome)
            .finish()
    }
}
