//! CLI argument definitions for `kc`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_NAME;

/// Version string shown by `kc --version`: package version, commit and build time.
pub const PACKAGE_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("KC_GIT_COMMIT"),
    " ",
    env!("KC_BUILD_TIMESTAMP"),
    ")"
);

pub fn package_version() -> &'static str {
    PACKAGE_VERSION
}

/// kc - read and write persistent application configuration.
///
/// Values are addressed with dot-separated keys (`window.width`) unless
/// `--flat` is given.
#[derive(Parser, Debug)]
#[command(name = "kc")]
#[command(author, version = PACKAGE_VERSION, about = "Read and write persistent, schema-validated configuration", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options selecting and opening the config file.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Directory holding the config file (must exist).
    /// Defaults to the user config directory of the project.
    #[arg(long = "dir", global = true, env = "KC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Base name of the config file, without extension
    #[arg(long = "name", global = true, env = "KC_CONFIG_NAME", default_value = DEFAULT_CONFIG_NAME)]
    pub config_name: String,

    /// Project name used for the default directory.
    /// Inferred from the nearest Cargo.toml when omitted.
    #[arg(long = "project", global = true, env = "KC_PROJECT")]
    pub project: Option<String>,

    /// Encrypt the config file with this password
    #[arg(long, global = true, env = "KC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Treat keys as opaque strings instead of dot-separated paths
    #[arg(long, global = true)]
    pub flat: bool,

    /// JSON schema file every stored document must satisfy
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// JSON file with default values
    #[arg(long, global = true)]
    pub defaults: Option<PathBuf>,

    /// Fail on an unreadable or invalid config file instead of discarding it
    #[arg(long = "keep-invalid", global = true)]
    pub keep_invalid: bool,

    /// File format of the config file
    #[arg(long, global = true, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,
}

/// Built-in file formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Toml,
}

impl FormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a value, or the whole document (defaults included) without a key
    Get {
        /// Key to read (e.g., window.width)
        key: Option<String>,
    },

    /// Store a value
    Set {
        /// Key to write (e.g., window.width)
        key: String,

        /// Value, parsed as JSON when possible and stored as a string otherwise
        value: String,
    },

    /// Check whether a key has a value
    Has {
        /// Key to check
        key: String,
    },

    /// Delete a key, or every stored value without one
    Delete {
        /// Key to delete
        key: Option<String>,
    },

    /// Print the path of the config file
    Path,
}
