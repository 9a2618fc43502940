//! The configuration engine.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::options::ConfigOptions;
use crate::cipher::Cipher;
use crate::document::{self, Document, PATH_SEPARATOR, Value};
use crate::format::Format;
use crate::fs::{self, Visibility};
use crate::naming;
use crate::schema::{self, SchemaValidator};
use crate::store::{AddressingMode, KeyedStore};
use crate::{Error, Result};

/// A configuration document kept in sync with one file.
///
/// Every successful mutation is validated and written to disk before it
/// returns. A mutation that breaks the schema is undone and reported as
/// [`Error::InvalidConfig`]; the file is left untouched.
///
/// `Config` is not synchronized. Wrap it in a mutex (or use
/// [`SharedConfig`](crate::SharedConfig)) to share it between threads.
pub struct Config {
    path: PathBuf,
    legacy_path: PathBuf,
    store: Box<dyn KeyedStore>,
    defaults: Box<dyn KeyedStore>,
    last_consistent: Document,
    schema: Option<Value>,
    format: Box<dyn Format>,
    cipher: Box<dyn Cipher>,
    validator: Box<dyn SchemaValidator>,
    password: Option<Zeroizing<String>>,
    addressing: AddressingMode,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("addressing", &self.addressing)
            .field("encrypted", &self.password.is_some())
            .field("store", self.store.all())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Open (or prepare) the config file described by `options`.
    ///
    /// Nothing is written here, even if a broken file was discarded; the
    /// file is created by the first mutation.
    ///
    /// # Errors
    /// - `Error::InvalidArgument` for unusable names, a non-mapping defaults
    ///   value or a missing explicit directory
    /// - `Error::InvalidConfigSchema` / `Error::InvalidDefaults` for a bad
    ///   schema or defaults that violate it
    /// - load failures (`WrongKeyOrCorrupted`, `Deserialization`,
    ///   `InvalidConfig`) when `clear_invalid_config` is off
    /// - `Error::Deserialization` if the file holds something other than a
    ///   mapping
    pub fn open(options: ConfigOptions) -> Result<Self> {
        let ConfigOptions {
            defaults,
            schema,
            config_name,
            project_name,
            config_dir,
            format,
            cipher,
            validator,
            password,
            addressing,
            clear_invalid_config,
        } = options;

        naming::validate_filename("config name", &config_name)?;
        if let Some(project) = &project_name {
            naming::validate_filename("project name", project)?;
        }
        let extension = format.extension();
        if extension.contains(['/', '\\']) {
            return Err(Error::InvalidArgument(format!(
                "The file extension \"{}\" must not contain path separators",
                extension
            )));
        }

        if let Some(schema) = &schema {
            schema::check_schema(validator.as_ref(), schema)?;
        }

        let defaults = document::into_document(defaults).map_err(|other| {
            Error::InvalidArgument(format!(
                "Defaults must be a mapping, got {}",
                document::type_name(&other)
            ))
        })?;
        if let Some(schema) = &schema {
            schema::validate_defaults(validator.as_ref(), schema, &Value::Object(defaults.clone()))?;
        }

        let dir = resolve_dir(config_dir, project_name)?;
        let plain_name = if extension.is_empty() {
            config_name.clone()
        } else {
            format!("{}.{}", config_name, extension)
        };
        let path = if password.is_some() {
            dir.join(&config_name)
        } else {
            dir.join(&plain_name)
        };
        let legacy_path = dir.join(&plain_name);

        let mut default_store = addressing.new_store();
        default_store.replace(defaults);

        let mut config = Self {
            path,
            legacy_path,
            store: addressing.new_store(),
            defaults: default_store,
            last_consistent: Document::new(),
            schema,
            format,
            cipher,
            validator,
            password,
            addressing,
        };

        let loaded = config.load(clear_invalid_config)?;
        config.store.replace(loaded.clone());
        config.last_consistent = loaded;
        Ok(config)
    }

    /// Read, decrypt, parse and validate the stored document.
    fn load(&self, clear_invalid: bool) -> Result<Document> {
        let mut bytes = None;

        if self.password.is_some()
            && self.legacy_path != self.path
            && !fs::exists(&self.path)
            && fs::exists(&self.legacy_path)
        {
            info!(
                from = %self.legacy_path.display(),
                to = %self.path.display(),
                "Migrating unencrypted config"
            );
            bytes = Some(fs::read_bytes(&self.legacy_path)?);
        }

        if fs::exists(&self.path) {
            let raw = fs::read_bytes(&self.path)?;
            bytes = match &self.password {
                Some(password) => match self.cipher.decrypt(&raw, password.as_str()) {
                    Ok(plain) => Some(plain),
                    Err(e) => {
                        self.discard(clear_invalid, e)?;
                        None
                    }
                },
                None => Some(raw),
            };
        }

        let mut value = Value::Object(Document::new());
        if let Some(bytes) = bytes {
            let parsed = String::from_utf8(bytes)
                .map_err(|e| Error::Deserialization(e.to_string()))
                .and_then(|text| self.format.deserialize(&text));
            match parsed {
                Ok(parsed) => value = parsed,
                Err(e) => self.discard(clear_invalid, e)?,
            }
        }

        let doc = document::into_document(value).map_err(|other| {
            Error::Deserialization(format!(
                "Config file must contain a mapping, found {}",
                document::type_name(&other)
            ))
        })?;

        if let Some(schema) = &self.schema {
            let checked =
                schema::validate_document(self.validator.as_ref(), schema, &Value::Object(doc.clone()));
            if let Err(e) = checked {
                self.discard(clear_invalid, e)?;
                return Ok(Document::new());
            }
        }

        Ok(doc)
    }

    /// Apply the clear-invalid policy to a load failure.
    fn discard(&self, clear_invalid: bool, err: Error) -> Result<()> {
        if !clear_invalid {
            return Err(err);
        }
        warn!(path = %self.path.display(), error = %err, "Discarding invalid config file");
        fs::remove(&self.path)
    }

    /// Path of the persisted file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn addressing(&self) -> AddressingMode {
        self.addressing
    }

    pub fn is_encrypted(&self) -> bool {
        self.password.is_some()
    }

    /// The defaults layered under the stored values.
    pub fn defaults(&self) -> &Document {
        self.defaults.all()
    }

    /// Check whether `key` has a stored value.
    ///
    /// In path mode a key without `.` also counts when it has a default.
    /// Nested defaults are only visible through [`get`](Self::get).
    pub fn has(&self, key: &str) -> bool {
        if self.store.has(key) {
            return true;
        }
        self.addressing == AddressingMode::Path
            && !key.contains(PATH_SEPARATOR)
            && self.defaults.has(key)
    }

    /// Look up `key`.
    ///
    /// Defaults apply only while the whole top-level branch of `key` is
    /// missing from the store: once `"window"` is stored,
    /// `get("window.height")` no longer sees a default for it.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.store.get(key) {
            return Some(value.clone());
        }
        if !self.store.has(document::top_level_segment(key)) {
            return self.defaults.get(key).cloned();
        }
        None
    }

    /// Look up `key`, returning `default` when neither the store nor the
    /// defaults have it.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Defaults merged with the stored values (stored wins at the top level).
    pub fn all(&self) -> Document {
        let mut merged = self.defaults.all().clone();
        merged.extend(self.store.all().clone());
        merged
    }

    /// Number of top-level entries in [`all`](Self::all).
    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the top-level entries of [`all`](Self::all).
    pub fn iter(&self) -> serde_json::map::IntoIter {
        self.all().into_iter()
    }

    /// Store `value` under `key` and persist.
    ///
    /// # Errors
    /// - `Error::InvalidArgument` for an empty key
    /// - `Error::InvalidConfig` if the result violates the schema (the change
    ///   is rolled back)
    /// - serialization, encryption and IO errors from writing
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("Key must not be empty".to_string()));
        }
        let value = value.into();
        self.mutate(|store| store.set(key, value))
    }

    /// Merge every pair of a mapping into the store and persist.
    ///
    /// # Errors
    /// `Error::InvalidArgument` if `values` is not a mapping, otherwise as
    /// [`set`](Self::set).
    pub fn set_all(&mut self, values: Value) -> Result<()> {
        let Value::Object(pairs) = values else {
            return Err(Error::InvalidArgument(format!(
                "Expected a mapping of keys to values, got {}",
                document::type_name(&values)
            )));
        };
        self.mutate(|store| store.merge_into(pairs))
    }

    /// Remove `key` from the store and persist.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.mutate(|store| store.delete(key))
    }

    /// Remove every stored value and persist. Defaults are kept.
    pub fn clear(&mut self) -> Result<()> {
        self.mutate(|store| store.clear())
    }

    /// Apply a change and commit it unless it left the store unchanged.
    fn mutate(&mut self, apply: impl FnOnce(&mut Box<dyn KeyedStore>)) -> Result<()> {
        let before = self.store.serialized_view();
        apply(&mut self.store);

        if self.store.serialized_view() == before {
            debug!(path = %self.path.display(), "Config unchanged, skipping write");
            return Ok(());
        }
        self.commit()
    }

    /// Validate the store and write it out, or roll back to the last
    /// consistent document.
    fn commit(&mut self) -> Result<()> {
        let doc = self.store.all().clone();

        if let Some(schema) = &self.schema {
            let checked =
                schema::validate_document(self.validator.as_ref(), schema, &Value::Object(doc.clone()));
            if let Err(e) = checked {
                debug!(path = %self.path.display(), "Rolling back change that violates the schema");
                self.store.replace(self.last_consistent.clone());
                return Err(e);
            }
        }

        self.last_consistent = doc;
        self.write()
    }

    fn write(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::ensure_dir(dir)?;
        }

        let text = self.format.serialize(&self.last_consistent)?;
        let (bytes, visibility) = match &self.password {
            Some(password) => (
                self.cipher.encrypt(text.as_bytes(), password.as_str())?,
                Visibility::Private,
            ),
            None => (text.into_bytes(), Visibility::Shared),
        };

        debug!(
            path = %self.path.display(),
            encrypted = self.password.is_some(),
            bytes = bytes.len(),
            "Writing config"
        );
        fs::write_atomic(&self.path, &bytes, visibility)
    }
}

/// Pick the explicit directory, or the per-project default one.
fn resolve_dir(config_dir: Option<PathBuf>, project_name: Option<String>) -> Result<PathBuf> {
    if let Some(dir) = config_dir {
        if !dir.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "Config directory does not exist: {}",
                dir.display()
            )));
        }
        return Ok(dir);
    }

    let project = match project_name {
        Some(project) => project,
        None => naming::infer_project_name()?,
    };
    let dir = naming::default_config_dir(&project)?;
    fs::ensure_dir(&dir)?;
    Ok(dir)
}
