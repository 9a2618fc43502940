//! Construction options for [`Config`](super::Config).

use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::cipher::{Cipher, PasswordCipher};
use crate::document::Value;
use crate::format::{Format, JsonFormat};
use crate::schema::{JsonSchemaValidator, SchemaValidator};
use crate::store::AddressingMode;

/// Default base name of the config file.
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Builder for opening a [`Config`](super::Config).
///
/// ```
/// use keepconf::{AddressingMode, ConfigOptions};
/// use serde_json::json;
///
/// let options = ConfigOptions::new()
///     .with_config_name("settings")
///     .with_defaults(json!({ "theme": "dark" }))
///     .with_addressing(AddressingMode::Flat);
/// assert_eq!(options.config_name(), "settings");
/// ```
pub struct ConfigOptions {
    pub(crate) defaults: Value,
    pub(crate) schema: Option<Value>,
    pub(crate) config_name: String,
    pub(crate) project_name: Option<String>,
    pub(crate) config_dir: Option<PathBuf>,
    pub(crate) format: Box<dyn Format>,
    pub(crate) cipher: Box<dyn Cipher>,
    pub(crate) validator: Box<dyn SchemaValidator>,
    pub(crate) password: Option<Zeroizing<String>>,
    pub(crate) addressing: AddressingMode,
    pub(crate) clear_invalid_config: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            defaults: Value::Object(Default::default()),
            schema: None,
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            project_name: None,
            config_dir: None,
            format: Box::new(JsonFormat::new()),
            cipher: Box::new(PasswordCipher::default()),
            validator: Box::new(JsonSchemaValidator),
            password: None,
            addressing: AddressingMode::default(),
            clear_invalid_config: true,
        }
    }
}

impl std::fmt::Debug for ConfigOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOptions")
            .field("defaults", &self.defaults)
            .field("schema", &self.schema)
            .field("config_name", &self.config_name)
            .field("project_name", &self.project_name)
            .field("config_dir", &self.config_dir)
            .field("format", &self.format)
            .field("cipher", &self.cipher)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("addressing", &self.addressing)
            .field("clear_invalid_config", &self.clear_invalid_config)
            .finish()
    }
}

impl ConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values returned when the store has no entry. Must be a mapping.
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    /// Schema every stored document must satisfy. Must be an object schema.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Base name of the config file, without extension.
    pub fn with_config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self
    }

    /// Project name used for the default config directory.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Directory holding the config file. It must already exist.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    pub fn with_format(mut self, format: impl Format + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    /// Same as [`with_format`](Self::with_format) for an already boxed format.
    pub fn with_boxed_format(mut self, format: Box<dyn Format>) -> Self {
        self.format = format;
        self
    }

    pub fn with_cipher(mut self, cipher: impl Cipher + 'static) -> Self {
        self.cipher = Box::new(cipher);
        self
    }

    pub fn with_validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Encrypt the file with this password.
    ///
    /// The encrypted file has no extension; an existing plaintext file with
    /// the format extension is migrated on first open.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    pub fn with_addressing(mut self, addressing: AddressingMode) -> Self {
        self.addressing = addressing;
        self
    }

    /// Shorthand for `with_addressing(AddressingMode::Flat)`.
    pub fn flat(self) -> Self {
        self.with_addressing(AddressingMode::Flat)
    }

    /// Whether an unreadable or invalid file is deleted on open (default)
    /// instead of failing.
    pub fn with_clear_invalid_config(mut self, clear: bool) -> Self {
        self.clear_invalid_config = clear;
        self
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn addressing(&self) -> AddressingMode {
        self.addressing
    }
}
