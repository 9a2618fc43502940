//! Dot-path store over nested mappings.
//!
//! Reads (`has`, `get`, `delete`) first try the whole key as a literal
//! top-level entry, then walk the segments. Writes always split the key, and
//! any non-mapping value found on the way is replaced with a mapping.

use super::KeyedStore;
use crate::document::{Document, PATH_SEPARATOR, Value};

/// A store that resolves `a.b.c` into nested mappings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStore {
    doc: Document,
}

impl PathStore {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }
}

fn lookup<'a>(doc: &'a Document, key: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(key) {
        return Some(value);
    }
    if !key.contains(PATH_SEPARATOR) {
        return None;
    }

    let mut segments = key.split(PATH_SEPARATOR);
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

impl KeyedStore for PathStore {
    fn replace(&mut self, doc: Document) {
        self.doc = doc;
    }

    fn all(&self) -> &Document {
        &self.doc
    }

    fn has(&self, key: &str) -> bool {
        lookup(&self.doc, key).is_some()
    }

    fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.doc, key)
    }

    fn set(&mut self, key: &str, value: Value) {
        let mut segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.doc;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            if !entry.is_object() {
                *entry = Value::Object(Document::new());
            }
            let Value::Object(map) = entry else {
                return;
            };
            current = map;
        }
        current.insert(last.to_string(), value);
    }

    fn merge_into(&mut self, pairs: Document) {
        for (key, value) in pairs {
            self.set(&key, value);
        }
    }

    fn delete(&mut self, key: &str) {
        if self.doc.shift_remove(key).is_some() {
            return;
        }

        let mut segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.doc;
        for segment in segments {
            match current.get_mut(segment) {
                Some(Value::Object(map)) => current = map,
                _ => return,
            }
        }
        current.shift_remove(last);
    }

    fn clear(&mut self) {
        self.doc.clear();
    }
}
