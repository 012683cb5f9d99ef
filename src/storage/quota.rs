//! Quota accounting
//!
//! Usage is recomputed from disk on every check. Checks are advisory: they
//! run before a size-increasing operation and do not reserve space, so an
//! external writer racing the check can still push usage past the limit.

use log::debug;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::StorageError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Per-jail byte limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    limit: u64,
}

impl QuotaPolicy {
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self {
            limit: megabytes.saturating_mul(BYTES_PER_MB),
        }
    }

    pub fn from_bytes(limit: u64) -> Self {
        Self { limit }
    }

    /// Maximum aggregate bytes of regular files
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// Point-in-time usage snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub used: u64,
    pub limit: u64,
}

impl QuotaStatus {
    /// Usage is strictly below the limit
    pub fn is_ok(&self) -> bool {
        self.used < self.limit
    }

    /// Whether `additional` more bytes still fit
    pub fn allows(&self, additional: u64) -> bool {
        self.is_ok() && self.used.saturating_add(additional) <= self.limit
    }

    /// Human-readable summary, e.g. `Used: 0.50 MB of 10.00 MB`
    pub fn summary(&self) -> String {
        format!(
            "Used: {:.2} MB of {:.2} MB",
            self.used as f64 / BYTES_PER_MB as f64,
            self.limit as f64 / BYTES_PER_MB as f64
        )
    }
}

/// Sums the sizes of regular files beneath `root`.
///
/// Directories and symlinks contribute nothing. Entries that vanish or cannot
/// be stat'ed while walking contribute zero instead of failing the walk.
pub fn usage(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.metadata().map(|m| m.len()).unwrap_or(0))
        .sum()
}

/// Current usage of `root` against `policy`
pub fn check(root: &Path, policy: &QuotaPolicy) -> QuotaStatus {
    let status = QuotaStatus {
        used: usage(root),
        limit: policy.limit(),
    };
    debug!(
        "Quota check for {}: {} / {} bytes",
        root.display(),
        status.used,
        status.limit
    );
    status
}

/// Rejects the operation unless `additional` bytes fit under the limit.
///
/// Usage already at or over the limit rejects every size-increasing
/// operation, including ones that add zero bytes.
pub fn ensure_capacity(
    root: &Path,
    policy: &QuotaPolicy,
    additional: u64,
) -> Result<QuotaStatus, StorageError> {
    let status = check(root, policy);
    if status.allows(additional) {
        Ok(status)
    } else {
        Err(StorageError::QuotaExceeded {
            used: status.used,
            limit: status.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_usage_sums_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        fs::write(dir.path().join("one.txt"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("a").join("b").join("two.txt"), vec![0u8; 50]).unwrap();

        assert_eq!(usage(dir.path()), 150);
    }

    #[test]
    fn test_missing_root_counts_as_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(usage(&dir.path().join("gone")), 0);
    }

    #[test]
    fn test_full_jail_rejects_zero_byte_growth() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fill.bin"), vec![0u8; 10]).unwrap();
        let policy = QuotaPolicy::from_bytes(10);

        let err = ensure_capacity(dir.path(), &policy, 0).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { used: 10, limit: 10 }));
    }

    #[test]
    fn test_projection_over_limit_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fill.bin"), vec![0u8; 4]).unwrap();
        let policy = QuotaPolicy::from_bytes(10);

        assert!(ensure_capacity(dir.path(), &policy, 6).is_ok());
        assert!(ensure_capacity(dir.path(), &policy, 7).is_err());
    }

    #[test]
    fn test_summary_format() {
        let status = QuotaStatus {
            used: BYTES_PER_MB / 2,
            limit: 10 * BYTES_PER_MB,
        };
        assert_eq!(status.summary(), "Used: 0.50 MB of 10.00 MB");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_counted() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("big.bin"), vec![0u8; 1000]).unwrap();
        symlink(outside.path(), dir.path().join("link")).unwrap();

        assert_eq!(usage(dir.path()), 0);
    }
}
