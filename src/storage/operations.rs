//! Storage operations
//!
//! The sandboxed operation set. Every operation resolves its arguments
//! through the jail's `PathResolver`, checks containment, checks quota when
//! it can increase stored bytes, and only then touches the file system.

use log::{error, info};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{NavigateError, StorageError};
use crate::navigate;
use crate::storage::archive::{
    ExtractionBudget, ExtractionPlan, archive_path_for, has_archive_extension, write_single_entry,
};
use crate::storage::filesystem::{directory_exists, file_exists, file_size, landing_path, move_file};
use crate::storage::quota::{self, QuotaPolicy, QuotaStatus};
use crate::storage::results::{DirEntry, ExtractResult};
use crate::storage::validation::{PathResolver, canonicalize_lenient};

/// File operations bound to one jail
#[derive(Debug, Clone)]
pub struct FileOps {
    resolver: PathResolver,
    policy: QuotaPolicy,
    strict_archive_quota: bool,
}

impl FileOps {
    pub fn new(jail_root: &Path, policy: QuotaPolicy) -> io::Result<Self> {
        Ok(Self {
            resolver: PathResolver::new(jail_root)?,
            policy,
            strict_archive_quota: false,
        })
    }

    /// Enable declared-size projection and running-total abort for `unarchive`
    pub fn with_strict_archive_quota(mut self, strict: bool) -> Self {
        self.strict_archive_quota = strict;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn jail_root(&self) -> &Path {
        self.resolver.jail_root()
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Current usage of the whole jail
    pub fn quota(&self) -> QuotaStatus {
        quota::check(self.jail_root(), &self.policy)
    }

    fn ensure_capacity(&self, additional: u64) -> Result<QuotaStatus, StorageError> {
        quota::ensure_capacity(self.jail_root(), &self.policy, additional)
    }

    fn display(&self, path: &Path) -> String {
        self.resolver.virtual_path(path)
    }

    fn existing_file(&self, name: &str, dir: &Path) -> Result<PathBuf, StorageError> {
        let path = self.resolver.resolve_existing(dir, name)?;
        if !file_exists(&path) {
            return Err(StorageError::FileNotFound(name.to_string()));
        }
        Ok(path)
    }

    /// Lists the immediate children of `dir`, sorted by name
    pub fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StorageError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            match entry.metadata() {
                Ok(metadata) => entries.push(DirEntry {
                    name,
                    is_dir: metadata.is_dir(),
                }),
                // Vanished between read_dir and stat
                Err(_) => continue,
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        info!("Listed {} - {} entries", self.display(dir), entries.len());
        Ok(entries)
    }

    /// Creates a subdirectory. An existing directory is not an error.
    pub fn mkdir(&self, name: &str, dir: &Path) -> Result<String, StorageError> {
        let path = self.resolver.resolve_target(dir, name)?;
        match fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && directory_exists(&path) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StorageError::FileAlreadyExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Created directory {}", path.display());
        Ok(self.display(&path))
    }

    /// Recursively deletes a subdirectory
    pub fn rmdir(&self, name: &str, dir: &Path) -> Result<String, StorageError> {
        let path = self
            .resolver
            .resolve_existing(dir, name)
            .map_err(|e| match e {
                StorageError::FileNotFound(p) => StorageError::DirectoryNotFound(p),
                other => other,
            })?;

        if !directory_exists(&path) {
            return Err(StorageError::DirectoryNotFound(name.to_string()));
        }
        if path == self.jail_root() {
            return Err(StorageError::OutOfJail(name.to_string()));
        }

        fs::remove_dir_all(&path).map_err(|e| {
            error!("Failed to remove directory {}: {}", path.display(), e);
            StorageError::from(e)
        })?;

        info!("Removed directory {}", path.display());
        Ok(self.display(&path))
    }

    /// Resolves a new working directory; never leaves the jail
    pub fn change_directory(&self, name: &str, dir: &Path) -> Result<PathBuf, NavigateError> {
        navigate::change_directory(&self.resolver, dir, name)
    }

    /// Creates an empty file, leaving an existing file untouched
    pub fn create_file(&self, name: &str, dir: &Path) -> Result<String, StorageError> {
        let path = self.resolver.resolve_target(dir, name)?;
        self.ensure_capacity(0)?;

        OpenOptions::new().write(true).create(true).truncate(false).open(&path)?;

        info!("Created file {}", path.display());
        Ok(self.display(&path))
    }

    /// Returns the whole file as text
    pub fn read_file(&self, name: &str, dir: &Path) -> Result<String, StorageError> {
        let path = self.existing_file(name, dir)?;
        let content = fs::read_to_string(&path)?;

        info!("Read {} bytes from {}", content.len(), path.display());
        Ok(content)
    }

    /// Replaces the file content with `text`
    pub fn write_file(&self, name: &str, text: &str, dir: &Path) -> Result<String, StorageError> {
        let path = self.resolver.resolve_target(dir, name)?;
        if directory_exists(&path) {
            return Err(StorageError::FileAlreadyExists(name.to_string()));
        }

        let replaced = file_size(&path);
        self.ensure_capacity((text.len() as u64).saturating_sub(replaced))?;

        fs::write(&path, text)?;

        info!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(self.display(&path))
    }

    /// Deletes a regular file
    pub fn remove_file(&self, name: &str, dir: &Path) -> Result<String, StorageError> {
        let path = self.existing_file(name, dir)?;
        fs::remove_file(&path).map_err(|e| {
            error!("Failed to delete file {}: {}", path.display(), e);
            StorageError::from(e)
        })?;

        info!("Deleted file {}", path.display());
        Ok(self.display(&path))
    }

    /// Resolves source and destination for copy/move.
    ///
    /// A destination naming an existing directory receives the file under its
    /// own name. The landing path is returned canonical, so a symlink already
    /// sitting there is followed before any comparison with the source.
    fn transfer_paths(
        &self,
        src: &str,
        dst: &str,
        dir: &Path,
    ) -> Result<(PathBuf, PathBuf), StorageError> {
        let src_path = self.existing_file(src, dir)?;
        let dst_path = self.resolver.resolve_target(dir, dst)?;
        let landing = canonicalize_lenient(&landing_path(&src_path, &dst_path))
            .map_err(|_| StorageError::OutOfJail(dst.to_string()))?;
        if !landing.starts_with(self.jail_root()) {
            return Err(StorageError::OutOfJail(dst.to_string()));
        }
        if directory_exists(&landing) {
            return Err(StorageError::FileAlreadyExists(dst.to_string()));
        }
        Ok((src_path, landing))
    }

    /// Copies a file inside the jail
    pub fn copy_file(&self, src: &str, dst: &str, dir: &Path) -> Result<String, StorageError> {
        let (src_path, landing) = self.transfer_paths(src, dst, dir)?;
        if landing == src_path {
            return Err(StorageError::FileAlreadyExists(dst.to_string()));
        }

        let incoming = file_size(&src_path).saturating_sub(file_size(&landing));
        self.ensure_capacity(incoming)?;

        fs::copy(&src_path, &landing)?;

        info!("Copied {} to {}", src_path.display(), landing.display());
        Ok(self.display(&landing))
    }

    /// Moves a file inside the jail. Usage is unchanged, so quota is not checked.
    pub fn move_file(&self, src: &str, dst: &str, dir: &Path) -> Result<String, StorageError> {
        let (src_path, landing) = self.transfer_paths(src, dst, dir)?;
        if landing != src_path {
            move_file(&src_path, &landing)?;
        }

        info!("Moved {} to {}", src_path.display(), landing.display());
        Ok(self.display(&landing))
    }

    /// Renames a file. Usage is unchanged, so quota is not checked.
    pub fn rename_file(&self, old: &str, new: &str, dir: &Path) -> Result<String, StorageError> {
        let old_path = self.existing_file(old, dir)?;
        let new_path = self.resolver.resolve_target(dir, new)?;
        if directory_exists(&new_path) {
            return Err(StorageError::FileAlreadyExists(new.to_string()));
        }

        fs::rename(&old_path, &new_path)?;

        info!("Renamed {} to {}", old_path.display(), new_path.display());
        Ok(self.display(&new_path))
    }

    /// Compresses a file into `<stem>.zip` next to it
    pub fn archive(&self, name: &str, dir: &Path) -> Result<String, StorageError> {
        let src_path = self.existing_file(name, dir)?;
        let archive_path = archive_path_for(&src_path);
        if archive_path == src_path {
            return Err(StorageError::FileAlreadyExists(self.display(&archive_path)));
        }
        if !self.resolver.is_contained(&archive_path) {
            return Err(StorageError::OutOfJail(self.display(&archive_path)));
        }
        if directory_exists(&archive_path) {
            return Err(StorageError::FileAlreadyExists(self.display(&archive_path)));
        }

        self.ensure_capacity(file_size(&src_path))?;

        let entry_name = src_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| StorageError::InvalidPath(name.to_string()))?;
        write_single_entry(&src_path, &entry_name, &archive_path)?;

        info!("Archived {} into {}", src_path.display(), archive_path.display());
        Ok(self.display(&archive_path))
    }

    /// Expands every entry of an archive into `dir`.
    ///
    /// Quota is checked once before expansion. In strict mode the declared
    /// uncompressed size is projected up front and a running total aborts the
    /// expansion once it would pass the limit.
    pub fn unarchive(&self, name: &str, dir: &Path) -> Result<ExtractResult, StorageError> {
        let archive_path = self
            .resolver
            .resolve_existing(dir, name)
            .map_err(|e| match e {
                StorageError::FileNotFound(p) => StorageError::NotAnArchive(p),
                other => other,
            })?;
        if !file_exists(&archive_path) || !has_archive_extension(&archive_path) {
            return Err(StorageError::NotAnArchive(name.to_string()));
        }

        let status = self.ensure_capacity(0)?;
        let plan = ExtractionPlan::prepare(&archive_path, dir, &self.resolver)?;
        let entries = plan.entry_count();

        let bytes = if self.strict_archive_quota {
            if !status.allows(plan.declared_size()) {
                return Err(StorageError::QuotaExceeded {
                    used: status.used.saturating_add(plan.declared_size()),
                    limit: status.limit,
                });
            }
            plan.extract(Some(ExtractionBudget {
                used: status.used,
                limit: status.limit,
            }))?
        } else {
            plan.extract(None)?
        };

        info!(
            "Unarchived {} into {} ({} entries, {} bytes)",
            archive_path.display(),
            dir.display(),
            entries,
            bytes
        );
        Ok(ExtractResult { entries, bytes })
    }
}
