//! Schema validation for configuration documents.
//!
//! Validation itself is pluggable through [`SchemaValidator`]; this module
//! owns the policy the engine applies on top of it:
//!
//! - A schema must describe an object (`"type": "object"`).
//! - Defaults must satisfy the schema completely, without help from schema
//!   `default` values.
//! - Stored documents may omit *top-level* required properties, since those
//!   are expected to come from the defaults. Every other violation is fatal,
//!   and the error carries the full list, exempted entries included.

mod validator;

pub use validator::JsonSchemaValidator;

use serde::Serialize;

use crate::document::{PATH_SEPARATOR, Value};
use crate::{Error, Result};

/// What kind of constraint a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    Type,
    Enum,
    Const,
    Minimum,
    Maximum,
    MultipleOf,
    Length,
    Pattern,
    Items,
    Properties,
    AdditionalProperties,
    Combinator,
    Reference,
}

/// A single schema check failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Location of the offending value (`"window.size"`, `"tags[2]"`);
    /// `None` for the document root
    pub path: Option<String>,
    /// Human-readable description
    pub message: String,
    /// The constraint that failed
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(kind: ViolationKind, path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            kind,
        }
    }

    /// A missing required property directly under the document root.
    pub fn is_top_level_required(&self) -> bool {
        self.kind == ViolationKind::Required
            && self
                .path
                .as_deref()
                .is_some_and(|path| !path.contains(PATH_SEPARATOR))
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => write!(f, "- [{}]: {}", path, self.message),
            _ => write!(f, "- {}", self.message),
        }
    }
}

/// The violation list attached to schema errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Whether schema `default` values take part in a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDefaults {
    /// Missing properties with a schema default are filled before checking.
    Apply,
    /// The document is checked exactly as given.
    Ignore,
}

/// Validate a document against a schema.
pub trait SchemaValidator: Send + Sync + std::fmt::Debug {
    /// Return every violation found; an empty list means valid.
    ///
    /// Implementations may fill schema defaults (only with
    /// [`SchemaDefaults::Apply`]) or coerce values while checking, but must
    /// not modify `doc`.
    fn validate(&self, doc: &Value, schema: &Value, defaults: SchemaDefaults) -> Vec<Violation>;

    /// Reject schemas this validator cannot enforce in full.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfigSchema` describing the first problem.
    fn check_schema(&self, _schema: &Value) -> Result<()> {
        Ok(())
    }
}

/// Check that `schema` describes an object and that `validator` can enforce it.
///
/// # Errors
/// Returns `Error::InvalidConfigSchema` otherwise.
pub fn check_schema(validator: &dyn SchemaValidator, schema: &Value) -> Result<()> {
    check_schema_shape(schema)?;
    validator.check_schema(schema)
}

/// Check that `schema` describes an object.
///
/// # Errors
/// Returns `Error::InvalidConfigSchema` otherwise.
pub fn check_schema_shape(schema: &Value) -> Result<()> {
    let is_object_schema = schema
        .as_object()
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str)
        == Some("object");

    if is_object_schema {
        Ok(())
    } else {
        Err(Error::InvalidConfigSchema(
            "Config schema is expected to be of \"type\": \"object\"".to_string(),
        ))
    }
}

/// Validate a stored (or about to be stored) document.
///
/// Missing top-level required properties are tolerated.
///
/// # Errors
/// Returns `Error::InvalidConfig` with all violations when any remaining
/// violation exists.
pub fn validate_document(
    validator: &dyn SchemaValidator,
    schema: &Value,
    doc: &Value,
) -> Result<()> {
    let violations = validator.validate(doc, schema, SchemaDefaults::Apply);
    if violations.iter().all(Violation::is_top_level_required) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(Violations(violations)))
    }
}

/// Validate the defaults document. No exemptions apply, and schema
/// `default` values do not count.
///
/// # Errors
/// Returns `Error::InvalidDefaults` on any violation.
pub fn validate_defaults(
    validator: &dyn SchemaValidator,
    schema: &Value,
    defaults: &Value,
) -> Result<()> {
    let violations = validator.validate(defaults, schema, SchemaDefaults::Ignore);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidDefaults(Violations(violations)))
    }
}
