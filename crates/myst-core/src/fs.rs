//! Atomic file writes for small files (configuration).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replace `destination` with `contents` without ever leaving a half-written file.
///
/// Writes to a sibling temp file, syncs it, then renames it over the target.
/// On unix the file is created with mode 0600, since configuration holds the
/// passphrase digest.
pub fn write_atomic(destination: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_sibling(destination);
    {
        let mut file = open_private(&temp_path)?;
        if let Err(err) = file.write_all(contents).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
    }
    rename_with_fallback(&temp_path, destination)
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".tmp-{}", std::process::id()));
    destination.with_file_name(name)
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Rename, removing an existing destination first where the platform
/// refuses to rename over it. The temp file is cleaned up on failure.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("myst").join("config.toml");

        write_atomic(&path, b"[storage]\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[storage]\n");
    }

    #[test]
    fn test_write_replaces_existing_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_atomic(&path, b"x").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
