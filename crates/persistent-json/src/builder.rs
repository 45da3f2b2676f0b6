//! Write-only accumulators for persistent collections.
//!
//! A builder is created empty, filled by exactly one decode call, and then
//! consumed by `freeze`. Until it is frozen the builder is the only owner of
//! the collection's nodes, so `push`/`put` update them in place instead of
//! path-copying. `freeze` takes `self` by value: there is no way to touch a
//! builder after its collection has been handed out.

use crate::{
    key::Key,
    value::{Array, Map, Value},
};

/// Accumulates the elements of an [`Array`].
///
/// ```
/// use persistent_json::{ArrayBuilder, Value};
///
/// let mut builder = ArrayBuilder::new();
/// builder.push(Value::from(1.0));
/// builder.push(Value::from("two"));
/// let array = builder.freeze();
/// assert_eq!(array.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ArrayBuilder {
    items: Array,
}

impl Default for ArrayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Array::new_sync(),
        }
    }

    /// Appends a value.
    pub fn push(&mut self, value: Value) {
        self.items.push_back_mut(value);
    }

    /// Number of values pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the builder and returns the immutable vector.
    #[must_use]
    pub fn freeze(self) -> Array {
        self.items
    }
}

/// Accumulates the entries of a [`Map`]. Later puts of an equal key replace
/// earlier ones.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    entries: Map,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Map::new_sync(),
        }
    }

    /// Inserts `value` under `key`, replacing any previous value.
    pub fn put(&mut self, key: Key, value: Value) {
        self.entries.insert_mut(key, value);
    }

    /// Number of distinct keys so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.size()
    }

    /// Returns `true` if nothing was put.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the builder and returns the immutable map.
    #[must_use]
    pub fn freeze(self) -> Map {
        self.entries
    }
}
