//! Impls - ports の in-memory 実装（開発用・テスト用）
//!
//! - `TargetRepository` for `HashMap` / `BTreeMap` / `Vec`
//! - **SequentialIdGenerator**: 決定的な JobId

pub mod repository;
pub mod sequential_ids;

pub use self::sequential_ids::SequentialIdGenerator;
