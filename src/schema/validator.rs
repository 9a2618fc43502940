//! Built-in validator for a practical subset of JSON Schema.
//!
//! Supported keywords: `type`, `enum`, `const`, `properties`,
//! `patternProperties`, `additionalProperties`, `required`,
//! `minProperties`, `maxProperties`, `items`, `minItems`, `maxItems`,
//! `uniqueItems`, `minimum`, `maximum`, `exclusiveMinimum`,
//! `exclusiveMaximum`, `multipleOf`, `minLength`, `maxLength`, `pattern`,
//! `allOf`, `anyOf`, `oneOf`, `not`, `default`, and `$ref` to a location
//! inside the same schema (`#`, `#/definitions/name`, `#/properties/a`).
//!
//! With [`SchemaDefaults::Apply`], schema defaults are filled into a working
//! copy before object checks, so a property with a default never counts as
//! missing.

use regex::Regex;

use super::{SchemaDefaults, SchemaValidator, Violation, ViolationKind};
use crate::document::{Document, Value, type_name};
use crate::{Error, Result};

/// Nesting limit for schema evaluation. Reference cycles that never descend
/// into the document stop here.
const MAX_DEPTH: usize = 256;

/// Keywords with validation meaning that this validator does not implement.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "additionalItems",
    "contains",
    "dependencies",
    "dependentRequired",
    "dependentSchemas",
    "if",
    "then",
    "else",
    "maxContains",
    "minContains",
    "prefixItems",
    "propertyNames",
    "unevaluatedItems",
    "unevaluatedProperties",
    "$dynamicRef",
    "$recursiveRef",
];

/// Validator for the JSON Schema subset listed in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, doc: &Value, schema: &Value, defaults: SchemaDefaults) -> Vec<Violation> {
        let walker = Walker {
            root: schema,
            fill_defaults: defaults == SchemaDefaults::Apply,
        };
        let mut working = doc.clone();
        let mut out = Vec::new();
        walker.check(&mut working, schema, None, 0, &mut out);
        out
    }

    fn check_schema(&self, schema: &Value) -> Result<()> {
        inspect(schema, schema, "#")
    }
}

fn unsupported(location: &str, message: impl std::fmt::Display) -> Error {
    Error::InvalidConfigSchema(format!("{} at {}", message, location))
}

/// Look up a same-document reference.
fn resolve<'s>(root: &'s Value, reference: &str) -> Option<&'s Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        Some(root)
    } else {
        root.pointer(pointer)
    }
}

/// Reject schemas this validator would silently under-enforce.
fn inspect(root: &Value, schema: &Value, location: &str) -> Result<()> {
    let schema = match schema {
        Value::Bool(_) => return Ok(()),
        Value::Object(schema) => schema,
        _ => return Err(unsupported(location, "A schema must be an object or a boolean")),
    };

    if let Some(reference) = schema.get("$ref") {
        let Some(reference) = reference.as_str() else {
            return Err(unsupported(location, "\"$ref\" must be a string"));
        };
        let mut seen = vec![reference];
        let mut target = resolve(root, reference);
        while let Some(next) = target.and_then(|t| t.get("$ref")).and_then(Value::as_str) {
            if seen.contains(&next) {
                return Err(unsupported(
                    location,
                    format!("Reference cycle through \"{}\"", next),
                ));
            }
            seen.push(next);
            target = resolve(root, next);
        }
        if target.is_none() {
            return Err(unsupported(
                location,
                format!("Unresolvable reference \"{}\"", seen.last().copied().unwrap_or(reference)),
            ));
        }
    }

    for keyword in UNSUPPORTED_KEYWORDS {
        if schema.contains_key(*keyword) {
            return Err(unsupported(
                location,
                format!("Unsupported schema keyword \"{}\"", keyword),
            ));
        }
    }

    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        if let Err(e) = Regex::new(pattern) {
            return Err(unsupported(location, format!("Invalid pattern: {}", e)));
        }
    }

    for keyword in ["properties", "patternProperties", "definitions", "$defs"] {
        if let Some(Value::Object(children)) = schema.get(keyword) {
            for (name, child) in children {
                if keyword == "patternProperties" {
                    if let Err(e) = Regex::new(name) {
                        return Err(unsupported(location, format!("Invalid pattern: {}", e)));
                    }
                }
                inspect(root, child, &format!("{}/{}/{}", location, keyword, name))?;
            }
        }
    }
    for keyword in ["allOf", "anyOf", "oneOf", "items"] {
        if let Some(Value::Array(children)) = schema.get(keyword) {
            for (index, child) in children.iter().enumerate() {
                inspect(root, child, &format!("{}/{}/{}", location, keyword, index))?;
            }
        }
    }
    for keyword in ["items", "additionalProperties", "not"] {
        if let Some(child @ (Value::Object(_) | Value::Bool(_))) = schema.get(keyword) {
            inspect(root, child, &format!("{}/{}", location, keyword))?;
        }
    }
    Ok(())
}

fn property_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{}.{}", parent, name),
        _ => name.to_string(),
    }
}

fn item_path(parent: Option<&str>, index: usize) -> String {
    format!("{}[{}]", parent.unwrap_or(""), index)
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => true,
    }
}

/// One validation run over a document.
struct Walker<'s> {
    root: &'s Value,
    fill_defaults: bool,
}

impl Walker<'_> {
    /// Run `schema` against a scratch copy and report whether it passed.
    fn passes(&self, value: &Value, schema: &Value, path: Option<&str>, depth: usize) -> bool {
        let mut scratch = value.clone();
        let mut out = Vec::new();
        self.check(&mut scratch, schema, path, depth, &mut out);
        out.is_empty()
    }

    fn check(
        &self,
        value: &mut Value,
        schema: &Value,
        path: Option<&str>,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        let here = || path.map(str::to_string);
        if depth > MAX_DEPTH {
            out.push(Violation::new(
                ViolationKind::Reference,
                here(),
                "Schema nesting is too deep",
            ));
            return;
        }

        let schema = match schema {
            Value::Bool(true) => return,
            Value::Bool(false) => {
                out.push(Violation::new(
                    ViolationKind::Combinator,
                    here(),
                    "No value is allowed here",
                ));
                return;
            }
            Value::Object(schema) => schema,
            _ => return,
        };

        // Draft 4: a reference replaces every sibling keyword.
        if let Some(reference) = schema.get("$ref") {
            let target = reference.as_str().and_then(|r| resolve(self.root, r));
            match target {
                Some(target) => self.check(value, target, path, depth + 1, out),
                None => out.push(Violation::new(
                    ViolationKind::Reference,
                    here(),
                    format!("Unresolvable reference {}", reference),
                )),
            }
            return;
        }

        if let Some(expected) = schema.get("type") {
            let names: Vec<&str> = match expected {
                Value::String(name) => vec![name.as_str()],
                Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            if !names.is_empty() && !names.iter().any(|name| matches_type(value, name)) {
                out.push(Violation::new(
                    ViolationKind::Type,
                    here(),
                    format!(
                        "{} value found, but {} is required",
                        type_name(value),
                        names.join(" or ")
                    ),
                ));
            }
        }

        if let Some(Value::Array(allowed)) = schema.get("enum") {
            if !allowed.contains(&*value) {
                out.push(Violation::new(
                    ViolationKind::Enum,
                    here(),
                    format!(
                        "Does not have a value in the enumeration {}",
                        Value::Array(allowed.clone())
                    ),
                ));
            }
        }

        if let Some(expected) = schema.get("const") {
            if expected != &*value {
                out.push(Violation::new(
                    ViolationKind::Const,
                    here(),
                    format!("Does not have the value {}", expected),
                ));
            }
        }

        match value {
            Value::Number(n) => {
                if let Some(n) = n.as_f64() {
                    check_number(n, schema, path, out);
                }
            }
            Value::String(s) => check_string(s, schema, path, out),
            Value::Array(items) => self.check_array(items, schema, path, depth, out),
            Value::Object(map) => self.check_object(map, schema, path, depth, out),
            _ => {}
        }

        self.check_combinators(value, schema, path, depth, out);
    }
}

fn check_number(n: f64, schema: &Document, path: Option<&str>, out: &mut Vec<Violation>) {
    let here = || path.map(str::to_string);
    let limit = |key: &str| schema.get(key).and_then(Value::as_f64);
    // Draft 4 spells exclusivity as a boolean next to minimum/maximum.
    let flag = |key: &str| schema.get(key).and_then(Value::as_bool).unwrap_or(false);

    if let Some(min) = limit("minimum") {
        if flag("exclusiveMinimum") && n <= min {
            out.push(Violation::new(
                ViolationKind::Minimum,
                here(),
                format!("Must have a minimum value greater than {}", min),
            ));
        } else if n < min {
            out.push(Violation::new(
                ViolationKind::Minimum,
                here(),
                format!("Must have a minimum value of {}", min),
            ));
        }
    }
    if let Some(min) = limit("exclusiveMinimum") {
        if n <= min {
            out.push(Violation::new(
                ViolationKind::Minimum,
                here(),
                format!("Must have a minimum value greater than {}", min),
            ));
        }
    }
    if let Some(max) = limit("maximum") {
        if flag("exclusiveMaximum") && n >= max {
            out.push(Violation::new(
                ViolationKind::Maximum,
                here(),
                format!("Must have a maximum value less than {}", max),
            ));
        } else if n > max {
            out.push(Violation::new(
                ViolationKind::Maximum,
                here(),
                format!("Must have a maximum value of {}", max),
            ));
        }
    }
    if let Some(max) = limit("exclusiveMaximum") {
        if n >= max {
            out.push(Violation::new(
                ViolationKind::Maximum,
                here(),
                format!("Must have a maximum value less than {}", max),
            ));
        }
    }
    if let Some(divisor) = limit("multipleOf") {
        let quotient = n / divisor;
        if divisor > 0.0 && (quotient - quotient.round()).abs() > 1e-9 {
            out.push(Violation::new(
                ViolationKind::MultipleOf,
                here(),
                format!("Must be a multiple of {}", divisor),
            ));
        }
    }
}

fn check_string(s: &str, schema: &Document, path: Option<&str>, out: &mut Vec<Violation>) {
    let here = || path.map(str::to_string);
    let len = s.chars().count() as u64;

    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if len < min {
            out.push(Violation::new(
                ViolationKind::Length,
                here(),
                format!("Must be at least {} characters long", min),
            ));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if len > max {
            out.push(Violation::new(
                ViolationKind::Length,
                here(),
                format!("Must be at most {} characters long", max),
            ));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(s) => out.push(Violation::new(
                ViolationKind::Pattern,
                here(),
                format!("Does not match the regex pattern {}", pattern),
            )),
            Ok(_) => {}
            Err(e) => tracing::warn!(pattern, error = %e, "Ignoring invalid schema pattern"),
        }
    }
}

impl Walker<'_> {
    fn check_array(
        &self,
        items: &mut [Value],
        schema: &Document,
        path: Option<&str>,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        let here = || path.map(str::to_string);
        let count = items.len() as u64;

        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            if count < min {
                out.push(Violation::new(
                    ViolationKind::Items,
                    here(),
                    format!("There must be a minimum of {} items in the array", min),
                ));
            }
        }
        if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
            if count > max {
                out.push(Violation::new(
                    ViolationKind::Items,
                    here(),
                    format!("There must be a maximum of {} items in the array", max),
                ));
            }
        }
        if schema.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
            let has_duplicates = items
                .iter()
                .enumerate()
                .any(|(i, a)| items[i + 1..].iter().any(|b| a == b));
            if has_duplicates {
                out.push(Violation::new(
                    ViolationKind::Items,
                    here(),
                    "There are no duplicates allowed in the array",
                ));
            }
        }

        match schema.get("items") {
            Some(Value::Array(tuple)) => {
                for (index, (item, item_schema)) in items.iter_mut().zip(tuple).enumerate() {
                    self.check(item, item_schema, Some(&item_path(path, index)), depth + 1, out);
                }
            }
            Some(item_schema) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.check(item, item_schema, Some(&item_path(path, index)), depth + 1, out);
                }
            }
            None => {}
        }
    }

    fn check_object(
        &self,
        map: &mut Document,
        schema: &Document,
        path: Option<&str>,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        let here = || path.map(str::to_string);
        let properties = schema.get("properties").and_then(Value::as_object);

        if let (true, Some(properties)) = (self.fill_defaults, properties) {
            for (name, property_schema) in properties {
                if map.contains_key(name) {
                    continue;
                }
                if let Some(default) = property_schema.get("default") {
                    map.insert(name.clone(), default.clone());
                }
            }
        }

        if let Some(Value::Array(required)) = schema.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(name) {
                    out.push(Violation::new(
                        ViolationKind::Required,
                        Some(property_path(path, name)),
                        format!("The property {} is required", name),
                    ));
                }
            }
        }

        let count = map.len() as u64;
        if let Some(min) = schema.get("minProperties").and_then(Value::as_u64) {
            if count < min {
                out.push(Violation::new(
                    ViolationKind::Properties,
                    here(),
                    format!("Must contain a minimum of {} properties", min),
                ));
            }
        }
        if let Some(max) = schema.get("maxProperties").and_then(Value::as_u64) {
            if count > max {
                out.push(Violation::new(
                    ViolationKind::Properties,
                    here(),
                    format!("Must contain no more than {} properties", max),
                ));
            }
        }

        let patterns: Vec<(Regex, &Value)> = schema
            .get("patternProperties")
            .and_then(Value::as_object)
            .map(|patterns| {
                patterns
                    .iter()
                    .filter_map(|(pattern, sub)| Regex::new(pattern).ok().map(|re| (re, sub)))
                    .collect()
            })
            .unwrap_or_default();
        let additional = schema.get("additionalProperties");

        for (name, child) in map.iter_mut() {
            let child_path = property_path(path, name);
            let mut matched = false;

            if let Some(property_schema) = properties.and_then(|p| p.get(name)) {
                matched = true;
                self.check(child, property_schema, Some(&child_path), depth + 1, out);
            }
            for (re, sub) in &patterns {
                if re.is_match(name) {
                    matched = true;
                    self.check(child, sub, Some(&child_path), depth + 1, out);
                }
            }
            if matched {
                continue;
            }

            match additional {
                Some(Value::Bool(false)) => out.push(Violation::new(
                    ViolationKind::AdditionalProperties,
                    here(),
                    format!(
                        "The property {} is not defined and the definition does not allow additional properties",
                        name
                    ),
                )),
                Some(sub @ Value::Object(_)) => {
                    self.check(child, sub, Some(&child_path), depth + 1, out)
                }
                _ => {}
            }
        }
    }

    fn check_combinators(
        &self,
        value: &mut Value,
        schema: &Document,
        path: Option<&str>,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        let here = || path.map(str::to_string);

        if let Some(Value::Array(all)) = schema.get("allOf") {
            for sub in all {
                self.check(value, sub, path, depth + 1, out);
            }
        }

        let value: &Value = value;
        if let Some(Value::Array(any)) = schema.get("anyOf") {
            if !any.iter().any(|sub| self.passes(value, sub, path, depth + 1)) {
                out.push(Violation::new(
                    ViolationKind::Combinator,
                    here(),
                    "Failed to match at least one schema",
                ));
            }
        }

        if let Some(Value::Array(one)) = schema.get("oneOf") {
            let matched = one
                .iter()
                .filter(|sub| self.passes(value, sub, path, depth + 1))
                .count();
            if matched != 1 {
                out.push(Violation::new(
                    ViolationKind::Combinator,
                    here(),
                    format!("Failed to match exactly one schema ({} matched)", matched),
                ));
            }
        }

        if let Some(not) = schema.get("not") {
            if self.passes(value, not, path, depth + 1) {
                out.push(Violation::new(
                    ViolationKind::Combinator,
                    here(),
                    "Matched a schema which it should not",
                ));
            }
        }
    }
}
