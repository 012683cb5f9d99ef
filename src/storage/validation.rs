//! Path validation
//!
//! Resolves user-supplied paths against a directory inside the jail and
//! decides containment on canonical (symlink-resolved) paths, never on the
//! textual form.

use log::warn;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Canonicalize a path that may not fully exist yet.
///
/// The longest existing prefix is canonicalized by the OS (following
/// symlinks); the missing remainder is normalized lexically. A prefix that is
/// a dangling symlink fails, because its target cannot be located.
pub fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let components: Vec<Component<'_>> = path.components().collect();

    let mut split = components.len();
    while split > 0 {
        let prefix: PathBuf = components[..split].iter().collect();
        if fs::symlink_metadata(&prefix).is_ok() {
            break;
        }
        split -= 1;
    }

    let prefix: PathBuf = components[..split].iter().collect();
    let mut resolved = if split == 0 {
        std::env::current_dir()?
    } else {
        prefix.canonicalize()?
    };

    for component in &components[split..] {
        match component {
            Component::Normal(name) => resolved.push(name),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    Ok(resolved)
}

/// Returns true iff `candidate` resolves to `jail_root` or a descendant of it.
///
/// Anything that cannot be resolved is treated as outside the jail.
pub fn is_contained(candidate: &Path, jail_root: &Path) -> bool {
    match (canonicalize_lenient(candidate), jail_root.canonicalize()) {
        (Ok(candidate), Ok(root)) => candidate.starts_with(&root),
        _ => false,
    }
}

/// Resolves paths for a single jail
#[derive(Debug, Clone)]
pub struct PathResolver {
    jail_root: PathBuf,
}

impl PathResolver {
    /// Binds a resolver to an existing jail directory
    pub fn new(jail_root: &Path) -> io::Result<Self> {
        Ok(Self {
            jail_root: jail_root.canonicalize()?,
        })
    }

    /// Canonical jail root
    pub fn jail_root(&self) -> &Path {
        &self.jail_root
    }

    /// Resolves `input` against `base` into a candidate absolute path.
    ///
    /// Absolute inputs are anchored at the jail root rather than the host
    /// filesystem root. The candidate is not checked for containment.
    pub fn resolve(&self, base: &Path, input: &str) -> Result<PathBuf, StorageError> {
        if input.is_empty() || input.contains('\0') {
            return Err(StorageError::InvalidPath(input.to_string()));
        }

        let joined = match input.strip_prefix('/') {
            Some(rest) => self.jail_root.join(rest.trim_start_matches('/')),
            None => base.join(input),
        };

        canonicalize_lenient(&joined).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::OutOfJail(input.to_string())
            } else {
                StorageError::IoError(e)
            }
        })
    }

    /// True iff `candidate` is the jail root or lies beneath it
    pub fn is_contained(&self, candidate: &Path) -> bool {
        is_contained(candidate, &self.jail_root)
    }

    /// Resolves an argument that must name something that already exists
    pub fn resolve_existing(&self, base: &Path, input: &str) -> Result<PathBuf, StorageError> {
        let candidate = self.resolve_contained(base, input)?;
        if fs::symlink_metadata(&candidate).is_err() {
            return Err(StorageError::FileNotFound(input.to_string()));
        }
        Ok(candidate)
    }

    /// Resolves a creation target; only its parent directory must exist
    pub fn resolve_target(&self, base: &Path, input: &str) -> Result<PathBuf, StorageError> {
        let candidate = self.resolve_contained(base, input)?;
        match candidate.parent() {
            Some(parent) if parent.is_dir() => Ok(candidate),
            Some(parent) => Err(StorageError::DirectoryNotFound(
                self.virtual_path(parent),
            )),
            None => Err(StorageError::InvalidPath(input.to_string())),
        }
    }

    /// Renders an in-jail path with `/` standing for the jail root
    pub fn virtual_path(&self, real: &Path) -> String {
        match real.strip_prefix(&self.jail_root) {
            Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
            Ok(rel) => format!("/{}", rel.to_string_lossy()),
            Err(_) => real.to_string_lossy().to_string(),
        }
    }

    fn resolve_contained(&self, base: &Path, input: &str) -> Result<PathBuf, StorageError> {
        let candidate = self.resolve(base, input)?;
        if !candidate.starts_with(&self.jail_root) {
            warn!(
                "Containment violation: '{}' resolved to {}",
                input,
                candidate.display()
            );
            return Err(StorageError::OutOfJail(input.to_string()));
        }
        Ok(candidate)
    }
}
