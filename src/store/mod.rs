//! Keyed stores over a configuration document.
//!
//! This module provides the two addressing modes a [`Config`](crate::Config)
//! can run in:
//! - `PathStore` - dot-separated keys address nested mappings (default)
//! - `FlatStore` - keys are opaque strings, `.` has no meaning

mod flat;
mod path;

pub use flat::FlatStore;
pub use path::PathStore;

use crate::document::{Document, Value};

/// An addressable container over a document.
///
/// The engine keeps two of these (user values and defaults) and only talks to
/// them through this trait, so both addressing modes share one commit path.
pub trait KeyedStore: Send + Sync + std::fmt::Debug {
    /// Discard the current contents and adopt `doc`.
    fn replace(&mut self, doc: Document);

    /// The full document.
    fn all(&self) -> &Document;

    /// Check whether a value exists under `key`.
    fn has(&self, key: &str) -> bool;

    /// Look up the value under `key`.
    fn get(&self, key: &str) -> Option<&Value>;

    /// Write `value` under `key`.
    fn set(&mut self, key: &str, value: Value);

    /// Write every pair of `pairs`, resolving keys per addressing mode.
    fn merge_into(&mut self, pairs: Document);

    /// Remove the value under `key`, if present.
    fn delete(&mut self, key: &str);

    /// Remove everything.
    fn clear(&mut self);

    /// Look up `key`, returning `default` when absent.
    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Canonical snapshot of the document, used for change detection and
    /// persistence.
    fn serialized_view(&self) -> Value {
        Value::Object(self.all().clone())
    }
}

/// How keys are interpreted by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// `.` separates nesting levels (`"window.width"`)
    #[default]
    Path,
    /// The whole key is one opaque entry
    Flat,
}

impl AddressingMode {
    /// Create an empty store using this addressing mode.
    pub fn new_store(self) -> Box<dyn KeyedStore> {
        match self {
            Self::Path => Box::new(PathStore::default()),
            Self::Flat => Box::new(FlatStore::default()),
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Flat => "flat",
        }
    }
}

impl std::fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
