//! Common test utilities for kc integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real config directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated config directory.
///
/// The `kc()` method returns a `Command` with `KC_CONFIG_DIR` set
/// per-invocation, making tests parallel-safe. Variables that could leak in
/// from the developer's shell are cleared.
pub struct TestEnv {
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the kc binary bound to this environment.
    pub fn kc(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kc"));
        cmd.current_dir(self.config_dir.path());
        cmd.env("KC_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("KC_CONFIG_NAME");
        cmd.env_remove("KC_PROJECT");
        cmd.env_remove("KC_PASSWORD");
        cmd.env_remove("KC_LOG");
        cmd
    }

    pub fn path(&self) -> &std::path::Path {
        self.config_dir.path()
    }

    /// Path of a file inside the config directory.
    pub fn file(&self, name: &str) -> std::path::PathBuf {
        self.config_dir.path().join(name)
    }

    /// Write a JSON helper file (schema, defaults) and return its path.
    pub fn write_json(&self, name: &str, value: &serde_json::Value) -> std::path::PathBuf {
        let path = self.file(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    /// Parse the stored plaintext config file.
    pub fn read_config(&self, name: &str) -> serde_json::Value {
        let content = std::fs::read_to_string(self.file(name)).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
