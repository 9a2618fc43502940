//! The document model shared by stores, formats and the validator.
//!
//! A document is a JSON-shaped tree. `serde_json::Value` already is the
//! closed variant we need (null, bool, number, string, sequence, mapping), so
//! it is reused rather than wrapped.

pub use serde_json::Value;

/// A top-level configuration document: string keys to values.
pub type Document = serde_json::Map<String, Value>;

/// Separator between nesting levels in path-based keys.
pub const PATH_SEPARATOR: char = '.';

/// The first segment of a (possibly dotted) key.
///
/// `"window.size.width"` yields `"window"`; a key without separator is
/// returned unchanged.
pub fn top_level_segment(key: &str) -> &str {
    key.split(PATH_SEPARATOR).next().unwrap_or(key)
}

/// Convert a deserialized value into a document.
///
/// Mappings are accepted as-is. An empty sequence is accepted as the empty
/// document, since some writers encode an empty mapping as `[]`. Everything
/// else is rejected and returned back to the caller.
pub fn into_document(value: Value) -> std::result::Result<Document, Value> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) if items.is_empty() => Ok(Document::new()),
        other => Err(other),
    }
}

/// Human-readable name of a value's type, used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
