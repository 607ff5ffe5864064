//! QueueBuilder - キューの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - `build()` で設定を検証し、不正なら `BuildError` を返す
//! - Clock / IdGenerator は省略時に SystemClock / UlidGenerator

use std::sync::Arc;
use std::time::Duration;

use super::execution_queue::ExecutionQueue;
use crate::config::QueueConfig;
use crate::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};

/// BuildError はキュー構築時のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("worker thread name must be non-empty and must not contain NUL bytes (got {0:?})")]
    InvalidThreadName(String),
}

/// Builds an `ExecutionQueue`.
///
/// # Example
/// ```ignore
/// let queue = QueueBuilder::from_config(QueueConfig::from_path("reconq.json")?)
///     .clock(FixedClock::new(at))
///     .build::<ProductId, Product>()?;
/// ```
pub struct QueueBuilder {
    config: QueueConfig,
    clock: Option<Arc<dyn Clock>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl QueueBuilder {
    pub fn new() -> Self {
        Self::from_config(QueueConfig::default())
    }

    pub fn from_config(config: QueueConfig) -> Self {
        Self {
            config,
            clock: None,
            id_generator: None,
        }
    }

    /// How long the worker waits on an empty inbound channel before re-checking
    /// the stop signal.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_thread_name = name.into();
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Some(Arc::new(id_generator));
        self
    }

    pub fn build<H, S>(self) -> Result<ExecutionQueue<H, S>, BuildError> {
        if self.config.poll_interval_ms == 0 {
            return Err(BuildError::ZeroPollInterval);
        }
        let name = &self.config.worker_thread_name;
        if name.is_empty() || name.contains('\0') {
            return Err(BuildError::InvalidThreadName(name.clone()));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let id_generator = self
            .id_generator
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        Ok(ExecutionQueue::with_parts(self.config, clock, id_generator))
    }
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}
