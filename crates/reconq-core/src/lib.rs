//! reconq-core
//!
//! Asynchronous reconstruction execution queue: the control thread submits
//! long-running reconstruction jobs, a single worker thread runs them in order,
//! and the results are applied back on the control thread when it drains.
//!
//! # モジュール構成
//! - **domain**: Job, FollowUpAction, outcome, lifecycle state, errors
//! - **ports**: Reconstructor, TargetEntity / TargetRepository, Clock, IdGenerator
//! - **app**: ExecutionQueue, WorkerLoop, QueueBuilder, ReconstructorRegistry
//! - **impls**: in-memory repositories and deterministic IDs
//! - **config**: QueueConfig (JSON)

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{ExecutionQueue, QueueBuilder, QueueStatus, ReconstructorRegistry};
pub use config::QueueConfig;
pub use domain::{
    ApplyError, ComputeError, FollowUpAction, Job, JobId, JobOutcome, JobReport, MisuseError,
    OutcomeKind, QueueError, QueueState,
};
pub use ports::{ReconstructOutput, Reconstructor, TargetEntity, TargetRepository};
