//! The key-value store decided operations are applied to.

use std::collections::HashMap;

use crate::operation::Key;
use crate::operation::Value;

/// Storage backend of the replicated state machine.
///
/// Only the operation log touches the store, one operation at a time.
pub trait KvStore: 'static + std::fmt::Debug {
    fn get(&self, key: Key) -> Option<Value>;

    fn set(&mut self, key: Key, value: Value);

    /// Stores `to` iff the current value equals `from`.
    ///
    /// Absent keys compare as the default value. Returns whether `to` was
    /// stored.
    fn compare_and_set(&mut self, key: Key, from: Value, to: Value) -> bool {
        if self.get(key).unwrap_or_default() == from {
            self.set(key, to);
            true
        } else {
            false
        }
    }
}

/// A [`KvStore`] backed by a `HashMap`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryStore(HashMap<Key, Value>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Key, Value)> for MemoryStore {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: Key) -> Option<Value> {
        self.0.get(&key).copied()
    }

    fn set(&mut self, key: Key, value: Value) {
        self.0.insert(key, value);
    }
}
