//! Process-wide config handle.
//!
//! ```no_run
//! use keepconf::{Config, ConfigOptions, SharedConfig};
//!
//! fn open() -> keepconf::Result<Config> {
//!     Config::open(ConfigOptions::new().with_project_name("my-app"))
//! }
//!
//! static CONFIG: SharedConfig = SharedConfig::new(open);
//!
//! # fn main() -> keepconf::Result<()> {
//! CONFIG.set("launched", true)?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::Result;
use crate::config::Config;
use crate::document::{Document, Value};

/// A lazily opened [`Config`] shared by the whole process.
///
/// The factory runs on first access. If it fails, the error is returned and
/// the next access tries again.
pub struct SharedConfig {
    factory: fn() -> Result<Config>,
    state: Mutex<Option<Config>>,
}

impl std::fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedConfig")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SharedConfig {
    pub const fn new(factory: fn() -> Result<Config>) -> Self {
        Self {
            factory,
            state: Mutex::new(None),
        }
    }

    /// Run `f` with exclusive access to the config, opening it if needed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Config) -> Result<R>) -> Result<R> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let config = match &mut *guard {
            Some(config) => config,
            empty => empty.insert((self.factory)()?),
        };
        f(config)
    }

    /// Whether the factory has already produced a config.
    pub fn is_open(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn file_path(&self) -> Result<PathBuf> {
        self.with(|config| Ok(config.file_path().to_path_buf()))
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        self.with(|config| Ok(config.has(key)))
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.with(|config| Ok(config.get(key)))
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Result<Value> {
        self.with(|config| Ok(config.get_or(key, default)))
    }

    pub fn all(&self) -> Result<Document> {
        self.with(|config| Ok(config.all()))
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.with(|config| config.set(key, value))
    }

    pub fn set_all(&self, values: Value) -> Result<()> {
        self.with(|config| config.set_all(values))
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.with(|config| config.delete(key))
    }

    pub fn clear(&self) -> Result<()> {
        self.with(|config| config.clear())
    }
}
