//! Unnested key-value store.

use super::KeyedStore;
use crate::document::{Document, Value};

/// A store where every key is a single top-level entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatStore {
    doc: Document,
}

impl FlatStore {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }
}

impl KeyedStore for FlatStore {
    fn replace(&mut self, doc: Document) {
        self.doc = doc;
    }

    fn all(&self) -> &Document {
        &self.doc
    }

    fn has(&self, key: &str) -> bool {
        self.doc.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.doc.insert(key.to_string(), value);
    }

    fn merge_into(&mut self, pairs: Document) {
        self.doc.extend(pairs);
    }

    fn delete(&mut self, key: &str) {
        self.doc.shift_remove(key);
    }

    fn clear(&mut self) {
        self.doc.clear();
    }
}
