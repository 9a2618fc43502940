//! Keepconf - persistent, schema-validated configuration for applications.
//!
//! A [`Config`] keeps a nested JSON-like document in sync with a single file
//! on disk. Values can be addressed by dot-separated paths, defaults are
//! layered underneath the stored values, every write is validated against an
//! optional JSON schema, and the file can be encrypted with a password.
//!
//! ```no_run
//! use keepconf::{Config, ConfigOptions};
//! use serde_json::json;
//!
//! # fn main() -> keepconf::Result<()> {
//! let mut config = Config::open(
//!     ConfigOptions::new()
//!         .with_project_name("my-app")
//!         .with_defaults(json!({ "theme": "dark" })),
//! )?;
//!
//! config.set("window.width", 1280)?;
//! assert_eq!(config.get("window"), Some(json!({ "width": 1280 })));
//! assert_eq!(config.get("theme"), Some(json!("dark")));
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod format;
pub mod fs;
pub mod naming;
pub mod schema;
pub mod shared;
pub mod store;

pub use cipher::{Cipher, PasswordCipher};
pub use config::{Config, ConfigOptions};
pub use document::{Document, Value};
pub use format::{Format, JsonFormat, TomlFormat};
pub use schema::{
    JsonSchemaValidator, SchemaDefaults, SchemaValidator, Violation, ViolationKind, Violations,
};
pub use shared::SharedConfig;
pub use store::{AddressingMode, FlatStore, KeyedStore, PathStore};

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::cipher::PasswordCipher;
    use crate::config::ConfigOptions;

    /// An isolated config directory that is removed on drop.
    pub struct TestEnv {
        pub dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        /// Options pointing at this environment's directory.
        ///
        /// Uses a cheap key derivation so encrypted round trips stay fast.
        pub fn options(&self) -> ConfigOptions {
            ConfigOptions::new()
                .with_config_dir(self.path())
                .with_cipher(fast_cipher())
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    pub fn fast_cipher() -> PasswordCipher {
        PasswordCipher::with_params(64, 1, 1).unwrap()
    }
}

/// Library-level error type for Keepconf operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration schema is not a valid JSON schema: {0}")]
    InvalidConfigSchema(String),

    #[error("Config defaults do not match the required JSON schema:\n{0}")]
    InvalidDefaults(Violations),

    #[error("Configuration does not match JSON schema:\n{0}")]
    InvalidConfig(Violations),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Wrong password or modified ciphertext")]
    WrongKeyOrCorrupted,

    #[error("Encryption environment is broken: {0}")]
    EnvironmentBroken(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The schema violations attached to this error, if any.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Error::InvalidDefaults(v) | Error::InvalidConfig(v) => Some(v),
            _ => None,
        }
    }
}

/// Result type alias for Keepconf operations.
pub type Result<T> = std::result::Result<T, Error>;
