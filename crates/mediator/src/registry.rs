//! # Handler Registry
//!
//! A concurrency-safe map from [`RequestKey`] to a handler binding. Inserts
//! never overwrite: the first binding for a key wins and later inserts report
//! the duplicate. `delete` only exists so a registration that fails
//! validation can be unwound.

use crate::request::RequestKey;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Routing-key to handler store guarded by a single mutex.
///
/// Values are cloned out on `load` so the lock is never held while a handler
/// runs; bindings are stored behind an `Arc` by the mediator.
#[derive(Debug)]
pub struct HandlerRegistry<V> {
    bindings: Mutex<HashMap<RequestKey, V>>,
}

impl<V> Default for HandlerRegistry<V> {
    fn default() -> Self {
        Self {
            bindings: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> HandlerRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` unless `key` is already bound.
    ///
    /// Returns `true` when a binding already existed; the existing value is
    /// left untouched in that case.
    pub fn store(&self, key: RequestKey, value: V) -> bool {
        match self.bindings.lock().entry(key) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(value);
                false
            }
        }
    }

    pub fn load(&self, key: &RequestKey) -> Option<V> {
        self.bindings.lock().get(key).cloned()
    }

    pub fn delete(&self, key: &RequestKey) {
        self.bindings.lock().remove(key);
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.bindings.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }

    /// Bound keys sorted by type name.
    pub fn keys(&self) -> Vec<RequestKey> {
        let mut keys: Vec<RequestKey> = self.bindings.lock().keys().copied().collect();
        keys.sort_by_key(|key| key.name());
        keys
    }
}
