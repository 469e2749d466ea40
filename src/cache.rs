use std::cell::RefCell;

use ecow::EcoString;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use crate::value::Value;

type Slots = IndexMap<EcoString, Value, FxBuildHasher>;

/// Per-instance attribute storage, keyed by name, in insertion order.
///
/// Reads hand out clones and never keep the map borrowed, so a compute
/// function is free to read other attributes of the same instance.
#[derive(Clone, Default)]
pub struct AttrCache {
    data: RefCell<Slots>,
}

/// Anything that holds named, mutable state.
pub trait HasAttrs {
    fn attrs(&self) -> &AttrCache;
}

impl std::fmt::Debug for AttrCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.borrow();
        crate::print::write_attrs(f, data.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl AttrCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.data.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.data.borrow().contains_key(name)
    }

    /// returns the value previously stored under `name`
    #[allow(clippy::must_use_candidate)]
    pub fn set(&self, name: impl Into<EcoString>, val: Value) -> Option<Value> {
        let name = name.into();
        tracing::trace!(%name, "attribute set");
        self.data.borrow_mut().insert(name, val)
    }

    // shift_remove keeps the remaining entries in insertion order
    #[allow(clippy::must_use_candidate)]
    pub fn remove(&self, name: &str) -> Option<Value> {
        let removed = self.data.borrow_mut().shift_remove(name);
        if removed.is_some() {
            tracing::trace!(name, "attribute removed");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<EcoString> {
        self.data.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<(EcoString, Value)> {
        self.data
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl HasAttrs for AttrCache {
    fn attrs(&self) -> &AttrCache {
        self
    }
}
