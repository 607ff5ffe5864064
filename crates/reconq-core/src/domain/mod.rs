//! Domain model: jobs, follow-up actions, outcomes, lifecycle state, errors.

pub mod errors;
pub mod follow_up;
pub mod ids;
pub mod job;
pub mod outcome;
pub mod state;

pub use self::errors::{ApplyError, ComputeError, MisuseError, QueueError};
pub use self::follow_up::FollowUpAction;
pub use self::ids::JobId;
pub use self::job::{ComputeFn, Job, JobTicket};
pub use self::outcome::{JobOutcome, JobReport, OutcomeKind};
pub use self::state::QueueState;
