//! Target port - 結果を書き戻す先（product repository）の抽象化
//!
//! Jobs only hold a handle `H`. The entity behind it is resolved on the control
//! thread at drain time, so the worker can never touch it.

/// An entity that receives reconstruction results.
pub trait TargetEntity<S> {
    /// Externally-assigned display name.
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Replace the entity's state wholesale. May clobber the name; callers that
    /// care (the queue does) restore it afterwards.
    fn assign(&mut self, state: S);
}

/// Resolves job handles to live entities.
pub trait TargetRepository<H, S> {
    type Entity: TargetEntity<S>;

    /// `None` when the handle no longer refers to an entity.
    fn resolve(&mut self, handle: &H) -> Option<&mut Self::Entity>;
}
