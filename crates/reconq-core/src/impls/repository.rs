//! In-memory `TargetRepository` implementations for std collections.
//!
//! - `HashMap<H, E>` / `BTreeMap<H, E>`: keyed products
//! - `Vec<E>`: index-addressed products (`usize` handles)

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::ports::{TargetEntity, TargetRepository};

impl<H, S, E> TargetRepository<H, S> for HashMap<H, E>
where
    H: Eq + Hash,
    E: TargetEntity<S>,
{
    type Entity = E;

    fn resolve(&mut self, handle: &H) -> Option<&mut E> {
        self.get_mut(handle)
    }
}

impl<H, S, E> TargetRepository<H, S> for BTreeMap<H, E>
where
    H: Ord,
    E: TargetEntity<S>,
{
    type Entity = E;

    fn resolve(&mut self, handle: &H) -> Option<&mut E> {
        self.get_mut(handle)
    }
}

impl<S, E> TargetRepository<usize, S> for Vec<E>
where
    E: TargetEntity<S>,
{
    type Entity = E;

    fn resolve(&mut self, handle: &usize) -> Option<&mut E> {
        self.get_mut(*handle)
    }
}
