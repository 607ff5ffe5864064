//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **ExecutionQueue**: submit / drain / stop の公開 API
//! - **WorkerLoop**: 単一ワーカースレッドでのジョブ実行
//! - **QueueBuilder**: 構築と設定検証
//! - **ReconstructorRegistry**: 名前による再構成アルゴリズムの登録
//! - **QueueStatus**: 状態スナップショット

pub mod builder;
pub mod execution_queue;
pub mod registry;
pub mod status;
mod tracker;
mod worker_loop;

pub use self::builder::{BuildError, QueueBuilder};
pub use self::execution_queue::ExecutionQueue;
pub use self::registry::{ReconstructorRegistry, RegistryError};
pub use self::status::QueueStatus;
