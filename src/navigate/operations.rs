//! Navigation operations implementation

use log::warn;
use std::path::{Path, PathBuf};

use crate::error::NavigateError;
use crate::storage::validation::PathResolver;

/// Resolves the directory a client asked to change into.
///
/// This is the single authoritative containment check for directory changes:
/// `..` at the jail root, symlinks pointing outside, and absolute escapes are
/// all rejected here, and the caller's current directory is never modified.
pub fn change_directory(
    resolver: &PathResolver,
    current_dir: &Path,
    target_path: &str,
) -> Result<PathBuf, NavigateError> {
    if target_path.is_empty() {
        return Err(NavigateError::InvalidPath("Empty path provided".into()));
    }

    let candidate = resolver.resolve(current_dir, target_path)?;

    if !resolver.is_contained(&candidate) {
        warn!(
            "Rejected directory change from {} to '{}'",
            current_dir.display(),
            target_path
        );
        return Err(NavigateError::OutOfJail(target_path.into()));
    }

    if !candidate.exists() {
        return Err(NavigateError::DirectoryNotFound(target_path.into()));
    }

    if !candidate.is_dir() {
        return Err(NavigateError::NotADirectory(target_path.into()));
    }

    Ok(candidate)
}
