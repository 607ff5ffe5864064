//! ReconstructorRegistry - 再構成アルゴリズムの登録と管理
//!
//! Reconstructors are registered by name as trait objects and looked up when a
//! job is built, instead of dispatching on the concrete backend type.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ports::Reconstructor;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("reconstructor '{0}' is already registered")]
    AlreadyRegistered(String),
}

pub struct ReconstructorRegistry<I, S> {
    reconstructors: BTreeMap<String, Arc<dyn Reconstructor<I, S>>>,
}

impl<I, S> ReconstructorRegistry<I, S> {
    pub fn new() -> Self {
        Self {
            reconstructors: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        reconstructor: Arc<dyn Reconstructor<I, S>>,
    ) -> Result<(), RegistryError> {
        let name = reconstructor.name().to_string();
        if self.reconstructors.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.reconstructors.insert(name, reconstructor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Reconstructor<I, S>>> {
        self.reconstructors.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.reconstructors.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.reconstructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reconstructors.is_empty()
    }
}

impl<I, S> Default for ReconstructorRegistry<I, S> {
    fn default() -> Self {
        Self::new()
    }
}
