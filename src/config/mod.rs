//! Persistent configuration.
//!
//! [`Config`] owns one config file. Opening it runs the load protocol:
//!
//! 1. Check names, schema and defaults.
//! 2. Resolve the directory (explicit, or `<user config dir>/<project>`).
//! 3. With a password and no encrypted file yet, read the plaintext
//!    `<name>.<ext>` file as migration source.
//! 4. Read the file, decrypt it, parse it and validate it. Failures in these
//!    steps delete the file and start empty when `clear_invalid_config` is
//!    set, and are returned otherwise.
//!
//! Writes snapshot the store, apply the change, skip unchanged documents,
//! validate, and write atomically. A schema violation restores the last
//! consistent document.
//!
//! ## File location
//!
//! - Plaintext: `<dir>/<name>.<ext>` (`<dir>/<name>` when the format has no
//!   extension)
//! - Encrypted: `<dir>/<name>`
//!
//! ## Security
//!
//! Encrypted files are created with 0600 permissions (owner read/write only).

mod engine;
mod options;

pub use engine::Config;
pub use options::{ConfigOptions, DEFAULT_CONFIG_NAME};
