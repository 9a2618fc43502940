//! Filesystem primitives used by the config engine.
//!
//! Writes are atomic: data goes to a temporary file in the destination
//! directory, is synced, then renamed over the target, so a crash never
//! leaves a half-written config behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::Result;

/// Permissions for encrypted config files (Unix: 0600, owner read/write only).
#[cfg(unix)]
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Permissions for plaintext config files (Unix: 0644, readable by all).
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o644;

/// Who may read a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Readable by everyone (plaintext configs)
    Shared,
    /// Owner only (encrypted configs)
    Private,
}

/// Check whether a file exists at `path`.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Read the whole file.
///
/// # Errors
/// Returns an IO error if the file cannot be read.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Atomically replace the file at `path` with `bytes`.
///
/// The parent directory must exist.
///
/// # Errors
/// Returns an IO error if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8], visibility: Visibility) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = match visibility {
            Visibility::Shared => CONFIG_FILE_MODE,
            Visibility::Private => SECRET_FILE_MODE,
        };
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = visibility;

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Delete the file at `path`. Does nothing if it doesn't exist.
///
/// # Errors
/// Returns an IO error if the file exists but cannot be deleted.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Create `dir` and all of its parents.
///
/// # Errors
/// Returns an IO error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        write_atomic(&path, b"{}", Visibility::Shared).unwrap();
        assert!(exists(&path));
        assert_eq!(read_bytes(&path).unwrap(), b"{}");

        write_atomic(&path, b"{\"a\":1}", Visibility::Shared).unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        write_atomic(&path, b"data", Visibility::Private).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let shared = dir.path().join("shared.json");
        let private = dir.path().join("private");

        write_atomic(&shared, b"{}", Visibility::Shared).unwrap();
        write_atomic(&private, b"{}", Visibility::Private).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&shared), CONFIG_FILE_MODE);
        assert_eq!(mode(&private), SECRET_FILE_MODE);
    }

    #[test]
    fn test_write_atomic_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("config.json");
        assert!(matches!(
            write_atomic(&path, b"{}", Visibility::Shared),
            Err(crate::Error::Io(_))
        ));
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nothing");
        assert!(remove(&path).is_ok());

        fs::write(&path, b"x").unwrap();
        remove(&path).unwrap();
        assert!(!exists(&path));
    }

    #[test]
    fn test_ensure_dir_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_bytes(&dir.path().join("nope")),
            Err(crate::Error::Io(_))
        ));
    }
}
