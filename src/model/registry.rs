use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{SharedAction, SharedValidator};

/// Keyed store of host callables.
///
/// Registration overwrites silently. Entries never expire; only [`clear`]
/// removes them. Repopulate fully before building a property tree that reads
/// from the registry.
///
/// [`clear`]: Registry::clear
pub struct Registry<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ids", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Clone> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, entry: T) {
        self.entries.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.entries.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clear, then register every entry of `entries`. No partial updates.
    pub fn replace_all<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        self.clear();
        for (id, entry) in entries {
            self.register(id, entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub type ValidatorRegistry = Registry<SharedValidator>;
pub type ActionRegistry = Registry<SharedAction>;
