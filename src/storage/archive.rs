//! Archive primitives
//!
//! Single-entry ZIP creation and full extraction. Extraction validates every
//! entry name against the jail before writing anything.

use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::StorageError;
use crate::storage::validation::{PathResolver, canonicalize_lenient};

/// Archive extension recognised by `unarchive`
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Archive path for `source`: same directory, extension replaced by `.zip`
pub fn archive_path_for(source: &Path) -> PathBuf {
    source.with_extension(ARCHIVE_EXTENSION)
}

/// Whether `path` carries the archive extension
pub fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Writes a deflated archive holding `source` under `entry_name`.
///
/// The archive is assembled in a freshly created temporary file next to
/// `dest` and persisted over it, so a failed write never leaves a truncated
/// archive behind and no pre-existing path is written through.
pub fn write_single_entry(source: &Path, entry_name: &str, dest: &Path) -> Result<(), StorageError> {
    let parent = dest
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(dest.display().to_string()))?;

    let mut writer = ZipWriter::new(NamedTempFile::new_in(parent)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry_name, options)?;
    let mut input = BufReader::new(File::open(source)?);
    io::copy(&mut input, &mut writer)?;

    let temp = writer.finish()?;
    temp.persist(dest).map_err(|e| StorageError::IoError(e.error))?;
    Ok(())
}

/// One validated archive member
struct PlannedEntry {
    index: usize,
    target: PathBuf,
    is_dir: bool,
    declared_size: u64,
}

/// Opened archive whose entries have all been checked against a jail
pub struct ExtractionPlan {
    archive: ZipArchive<BufReader<File>>,
    entries: Vec<PlannedEntry>,
}

impl ExtractionPlan {
    /// Opens `archive_path` and resolves every entry under `dest`.
    ///
    /// Fails with `OutOfJail` if any entry is absolute, climbs with `..`, or
    /// would land outside the jail through an existing symlink, and with
    /// `FileAlreadyExists` if an entry would overwrite the archive itself.
    pub fn prepare(
        archive_path: &Path,
        dest: &Path,
        resolver: &PathResolver,
    ) -> Result<Self, StorageError> {
        let source = archive_path.canonicalize()?;
        let mut archive = ZipArchive::new(BufReader::new(File::open(&source)?))?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            let raw_name = entry.name().to_string();
            let relative = entry.enclosed_name().ok_or_else(|| {
                warn!("Archive entry escapes extraction root: {}", raw_name);
                StorageError::OutOfJail(raw_name.clone())
            })?;

            let target = dest.join(relative);
            if !resolver.is_contained(&target) {
                warn!("Archive entry resolves outside jail: {}", raw_name);
                return Err(StorageError::OutOfJail(raw_name));
            }
            // Extracting over the archive would truncate it while it is read
            if canonicalize_lenient(&target).is_ok_and(|t| t == source) {
                warn!("Archive entry would overwrite its own archive: {}", raw_name);
                return Err(StorageError::FileAlreadyExists(raw_name));
            }

            entries.push(PlannedEntry {
                index,
                target,
                is_dir: entry.is_dir(),
                declared_size: entry.size(),
            });
        }

        Ok(Self { archive, entries })
    }

    /// Sum of the uncompressed sizes the archive claims for its files
    pub fn declared_size(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .fold(0u64, |acc, e| acc.saturating_add(e.declared_size))
    }

    /// Number of entries, directories included
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Writes every entry. With a `budget`, extraction stops with
    /// `QuotaExceeded` as soon as the bytes written would exceed it; the
    /// partially written entry is removed.
    pub fn extract(mut self, budget: Option<ExtractionBudget>) -> Result<u64, StorageError> {
        let mut written: u64 = 0;

        for planned in &self.entries {
            if planned.is_dir {
                fs::create_dir_all(&planned.target)?;
                continue;
            }

            if let Some(parent) = planned.target.parent() {
                fs::create_dir_all(parent)?;
            }

            let entry = self.archive.by_index(planned.index)?;
            let mut output = File::create(&planned.target)?;

            let copied = match budget {
                Some(budget) => {
                    let allowance = budget.remaining(written);
                    let copied = io::copy(&mut entry.take(allowance.saturating_add(1)), &mut output)?;
                    if copied > allowance {
                        drop(output);
                        let _ = fs::remove_file(&planned.target);
                        return Err(StorageError::QuotaExceeded {
                            used: budget.used.saturating_add(written).saturating_add(copied),
                            limit: budget.limit,
                        });
                    }
                    copied
                }
                None => {
                    let mut entry = entry;
                    io::copy(&mut entry, &mut output)?
                }
            };
            written = written.saturating_add(copied);
        }

        info!("Extracted {} entries ({} bytes)", self.entries.len(), written);
        Ok(written)
    }
}

/// Running-total limit applied during strict extraction
#[derive(Debug, Clone, Copy)]
pub struct ExtractionBudget {
    pub used: u64,
    pub limit: u64,
}

impl ExtractionBudget {
    fn remaining(&self, written: u64) -> u64 {
        self.limit
            .saturating_sub(self.used)
            .saturating_sub(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn jail() -> (TempDir, PathResolver) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("jail");
        fs::create_dir_all(&root).unwrap();
        let resolver = PathResolver::new(&root).unwrap();
        (dir, resolver)
    }

    fn read_entry(archive_path: &Path, name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        buf
    }

    fn raw_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_archive_naming() {
        assert_eq!(
            archive_path_for(Path::new("/j/notes.txt")),
            PathBuf::from("/j/notes.zip")
        );
        assert_eq!(archive_path_for(Path::new("/j/notes")), PathBuf::from("/j/notes.zip"));
        assert!(has_archive_extension(Path::new("a.ZIP")));
        assert!(!has_archive_extension(Path::new("a.txt")));
    }

    #[test]
    fn test_single_entry_content() {
        let (_dir, resolver) = jail();
        let root = resolver.jail_root();
        fs::write(root.join("notes.txt"), b"some notes").unwrap();

        write_single_entry(&root.join("notes.txt"), "notes.txt", &root.join("notes.zip")).unwrap();

        assert_eq!(read_entry(&root.join("notes.zip"), "notes.txt"), b"some notes");
        assert_eq!(fs::read_dir(root).unwrap().count(), 2);
    }

    #[test]
    fn test_traversal_entry_rejects_whole_archive() {
        let (_dir, resolver) = jail();
        let root = resolver.jail_root();
        let archive = root.join("evil.zip");
        raw_archive(&archive, &[("fine.txt", &b"ok"[..]), ("../escape.txt", &b"bad"[..])]);

        let err = ExtractionPlan::prepare(&archive, root, &resolver).err().unwrap();
        assert!(matches!(err, StorageError::OutOfJail(_)));
        assert!(!root.join("fine.txt").exists());
    }

    #[test]
    fn test_budget_aborts_extraction() {
        let (_dir, resolver) = jail();
        let root = resolver.jail_root();
        let archive = root.join("big.zip");
        raw_archive(&archive, &[("a.bin", &[1u8; 64][..]), ("b.bin", &[2u8; 64][..])]);

        let plan = ExtractionPlan::prepare(&archive, root, &resolver).unwrap();
        assert_eq!(plan.declared_size(), 128);
        let err = plan
            .extract(Some(ExtractionBudget { used: 0, limit: 100 }))
            .unwrap_err();

        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert!(root.join("a.bin").exists());
        assert!(!root.join("b.bin").exists());
    }

    #[test]
    fn test_nested_entries_create_directories() {
        let (_dir, resolver) = jail();
        let root = resolver.jail_root();
        let archive = root.join("tree.zip");
        raw_archive(&archive, &[("sub/deep/file.txt", &b"deep"[..])]);

        let plan = ExtractionPlan::prepare(&archive, root, &resolver).unwrap();
        assert_eq!(plan.extract(None).unwrap(), 4);
        assert_eq!(fs::read(root.join("sub/deep/file.txt")).unwrap(), b"deep");
    }
}
