//! Command implementations for the `kc` CLI.
//!
//! Each command returns a result type implementing [`Output`], which the
//! binary prints as JSON (default) or human-readable text.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::ConfigArgs;
use crate::config::{Config, ConfigOptions};
use crate::document::Value;
use crate::format;
use crate::store::AddressingMode;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn read_json_file(what: &str, path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        Error::InvalidArgument(format!("Could not parse {} file {}: {}", what, path.display(), e))
    })
}

/// Build `ConfigOptions` from command line arguments.
pub fn options_from_args(args: &ConfigArgs) -> Result<ConfigOptions> {
    let format = format::by_name(args.format.as_str()).ok_or_else(|| {
        Error::InvalidArgument(format!("Unknown format: {}", args.format.as_str()))
    })?;

    let mut options = ConfigOptions::new()
        .with_config_name(args.config_name.clone())
        .with_boxed_format(format)
        .with_clear_invalid_config(!args.keep_invalid);

    if args.flat {
        options = options.with_addressing(AddressingMode::Flat);
    }
    if let Some(dir) = &args.config_dir {
        options = options.with_config_dir(dir.clone());
    }
    if let Some(project) = &args.project {
        options = options.with_project_name(project.clone());
    }
    if let Some(password) = &args.password {
        options = options.with_password(password.clone());
    }
    if let Some(path) = &args.schema {
        options = options.with_schema(read_json_file("schema", path)?);
    }
    if let Some(path) = &args.defaults {
        options = options.with_defaults(read_json_file("defaults", path)?);
    }
    Ok(options)
}

/// Open the config selected by command line arguments.
pub fn open(args: &ConfigArgs) -> Result<Config> {
    Config::open(options_from_args(args)?)
}

/// Interpret a command line value: JSON when it parses, a plain string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn render_human(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

// === get ===

pub struct GetResult {
    pub key: Option<String>,
    pub value: Value,
}

impl Output for GetResult {
    fn to_json(&self) -> String {
        self.value.to_string()
    }

    fn to_human(&self) -> String {
        match (&self.key, &self.value) {
            (Some(key), Value::Null) => format!("{} is not set", key),
            (_, value) => render_human(value),
        }
    }
}

/// Read one value, or the merged document without a key.
pub fn get(config: &Config, key: Option<&str>) -> GetResult {
    let value = match key {
        Some(key) => config.get(key).unwrap_or(Value::Null),
        None => Value::Object(config.all()),
    };
    GetResult {
        key: key.map(str::to_string),
        value,
    }
}

// === set ===

#[derive(Serialize)]
pub struct SetResult {
    pub key: String,
    pub value: Value,
}

impl Output for SetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }
}

/// Store a value parsed from the command line.
pub fn set(config: &mut Config, key: &str, raw: &str) -> Result<SetResult> {
    let value = parse_value(raw);
    config.set(key, value.clone())?;
    Ok(SetResult {
        key: key.to_string(),
        value,
    })
}

// === has ===

pub struct HasResult {
    pub key: String,
    pub exists: bool,
}

impl Output for HasResult {
    fn to_json(&self) -> String {
        self.exists.to_string()
    }

    fn to_human(&self) -> String {
        self.exists.to_string()
    }
}

pub fn has(config: &Config, key: &str) -> HasResult {
    HasResult {
        key: key.to_string(),
        exists: config.has(key),
    }
}

// === delete ===

#[derive(Serialize)]
pub struct DeleteResult {
    /// The deleted key; `None` when the whole store was cleared
    pub key: Option<String>,
    pub remaining: usize,
}

impl Output for DeleteResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match &self.key {
            Some(key) => format!("Deleted {}", key),
            None => "Cleared all stored values".to_string(),
        }
    }
}

/// Delete one key, or clear the store without one.
pub fn delete(config: &mut Config, key: Option<&str>) -> Result<DeleteResult> {
    match key {
        Some(key) => config.delete(key)?,
        None => config.clear()?,
    }
    Ok(DeleteResult {
        key: key.map(str::to_string),
        remaining: config.len(),
    })
}

// === path ===

#[derive(Serialize)]
pub struct PathResult {
    pub path: PathBuf,
    pub exists: bool,
    pub encrypted: bool,
}

impl Output for PathResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn path(config: &Config) -> PathResult {
    PathResult {
        path: config.file_path().to_path_buf(),
        exists: config.file_path().exists(),
        encrypted: config.is_encrypted(),
    }
}
