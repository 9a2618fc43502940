//! File formats a configuration can be persisted in.
//!
//! A format is a strategy object handed to [`ConfigOptions`](crate::ConfigOptions):
//! it names the file extension and converts a document to and from text.
//! `JsonFormat` is the default.

use crate::document::{Document, Value};
use crate::{Error, Result};

/// Serialize and deserialize documents.
pub trait Format: Send + Sync + std::fmt::Debug {
    /// File extension without the leading dot (may be empty).
    fn extension(&self) -> &str;

    /// Render a document as text.
    ///
    /// # Errors
    /// Returns `Error::Serialization` if the document cannot be represented.
    fn serialize(&self, doc: &Document) -> Result<String>;

    /// Parse text into a value. The engine checks that it is a mapping.
    ///
    /// # Errors
    /// Returns `Error::Deserialization` on malformed input.
    fn deserialize(&self, text: &str) -> Result<Value>;
}

/// Pretty-printed JSON (default).
#[derive(Debug, Clone)]
pub struct JsonFormat {
    extension: String,
}

impl JsonFormat {
    pub fn new() -> Self {
        Self {
            extension: "json".to_string(),
        }
    }

    /// JSON content under a different file extension.
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl Format for JsonFormat {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn serialize(&self, doc: &Document) -> Result<String> {
        serde_json::to_string_pretty(doc).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<Value> {
        serde_json::from_str(text).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// TOML documents. TOML has no null, so documents containing nulls fail to
/// serialize.
#[derive(Debug, Clone, Default)]
pub struct TomlFormat;

impl Format for TomlFormat {
    fn extension(&self) -> &str {
        "toml"
    }

    fn serialize(&self, doc: &Document) -> Result<String> {
        toml::to_string(doc).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<Value> {
        toml::from_str(text).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Look up a built-in format by name, case-insensitive.
pub fn by_name(name: &str) -> Option<Box<dyn Format>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(JsonFormat::new())),
        "toml" => Some(Box::new(TomlFormat)),
        _ => None,
    }
}
