//! File and project naming rules.
//!
//! Config names and project names end up as path components, so both are
//! checked against the rules that hold on every supported platform: no
//! reserved device names, no separators, no control characters.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Characters that may never appear in a file name.
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names reserved on Windows (without the trailing digit variants).
const RESERVED_NAMES: &[&str] = &["con", "prn", "aux", "nul"];

/// Reserved names that take a single trailing digit (`com1`, `lpt9`).
const RESERVED_NUMBERED: &[&str] = &["com", "lpt"];

fn is_reserved(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str()) {
        return true;
    }
    RESERVED_NUMBERED.iter().any(|prefix| {
        lower.len() == prefix.len() + 1
            && lower.starts_with(prefix)
            && lower.as_bytes()[prefix.len()].is_ascii_digit()
    })
}

/// Check that `name` is usable as a file name.
///
/// `what` names the option in the error message ("config name",
/// "project name").
///
/// # Errors
/// Returns `Error::InvalidArgument` if the name is empty, is a reserved
/// device name, or contains a separator or control character.
pub fn validate_filename(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument(format!("The {} must not be empty", what)));
    }
    if is_reserved(name) {
        return Err(Error::InvalidArgument(format!(
            "The {} \"{}\" is a reserved file name",
            what, name
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || u32::from(*c) < 0x20)
    {
        return Err(Error::InvalidArgument(format!(
            "The {} \"{}\" contains the invalid character {:?}",
            what, name, c
        )));
    }
    Ok(())
}

/// Turn an arbitrary package name into something safe for a directory name.
///
/// Characters outside `[A-Za-z0-9._-]` become `-`, and runs of underscores
/// collapse to one.
pub fn sanitize_project_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<Package>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
}

/// Find the nearest `Cargo.toml` at or above `start`.
fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("Cargo.toml"))
        .find(|candidate| candidate.is_file())
}

/// Infer a project name from the `[package] name` of the nearest
/// `Cargo.toml`, searching upwards from `start`.
///
/// # Errors
/// Returns `Error::InvalidArgument` if no manifest with a package name is
/// found.
pub fn infer_project_name_from(start: &Path) -> Result<String> {
    let not_found = || {
        Error::InvalidArgument(
            "Project name could not be inferred. Please specify the project name".to_string(),
        )
    };

    let manifest_path = find_manifest(start).ok_or_else(not_found)?;
    let content = std::fs::read_to_string(&manifest_path)?;
    let manifest: Manifest = toml::from_str(&content).map_err(|e| {
        Error::InvalidArgument(format!(
            "Could not parse {}: {}",
            manifest_path.display(),
            e
        ))
    })?;

    let name = manifest.package.map(|p| p.name).ok_or_else(not_found)?;
    let name = sanitize_project_name(&name);
    if name.is_empty() {
        return Err(not_found());
    }
    Ok(name)
}

/// Infer a project name starting from the current directory.
///
/// # Errors
/// See [`infer_project_name_from`].
pub fn infer_project_name() -> Result<String> {
    let cwd = std::env::current_dir()?;
    infer_project_name_from(&cwd)
}

/// The default config directory for a project: `<user config dir>/<project>`.
///
/// The directory is not created.
///
/// # Errors
/// Returns an IO error if the platform has no user config directory.
pub fn default_config_dir(project: &str) -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine the user config directory",
        )
    })?;
    Ok(base.join(project))
}
