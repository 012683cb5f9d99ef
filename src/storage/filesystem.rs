//! File system primitives
//!
//! Thin wrappers over `std::fs` used by the sandboxed operations.

use std::fs;
use std::io::{self, Result};
use std::path::{Path, PathBuf};

/// Check if a regular file exists (symlinks are followed)
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Check if a directory exists (symlinks are followed)
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Size of a regular file, zero when it is absent or not a file
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Where `src` lands when copied or moved to `dst`.
///
/// An existing directory at `dst` receives the file under its own name.
pub fn landing_path(src: &Path, dst: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) if dst.is_dir() => dst.join(name),
        _ => dst.to_path_buf(),
    }
}

/// Rename, falling back to copy and delete across devices
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(src, dst)?;
            fs::remove_file(src)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_landing_path_into_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        assert_eq!(landing_path(&src, &sub), sub.join("a.txt"));
        assert_eq!(landing_path(&src, &dir.path().join("b.txt")), dir.path().join("b.txt"));
    }

    #[test]
    fn test_file_size_of_directory_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(file_size(dir.path()), 0);
    }
}
