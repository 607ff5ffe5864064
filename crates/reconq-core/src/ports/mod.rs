//! Ports - 外部コラボレータとの境界
//!
//! - **Reconstructor**: 数値計算バックエンド（worker スレッドで実行）
//! - **TargetEntity / TargetRepository**: 結果の書き戻し先（control スレッドのみ）
//! - **Clock / IdGenerator**: テストで差し替え可能な時刻と ID

pub mod clock;
pub mod id_generator;
pub mod reconstructor;
pub mod target;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::reconstructor::{ReconstructOutput, Reconstructor};
pub use self::target::{TargetEntity, TargetRepository};
