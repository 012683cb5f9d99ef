//! Client session management
//!
//! A `SessionContext` is the explicit per-login state: the user, the
//! operations bound to that user's jail, and the current directory. It is
//! passed to every core call; nothing about the active user is global.

use std::path::{Path, PathBuf};

use crate::error::NavigateError;
use crate::storage::FileOps;

/// Live, authenticated context of one user
#[derive(Debug, Clone)]
pub struct SessionContext {
    username: String,
    ops: FileOps,
    current_dir: PathBuf,
}

impl SessionContext {
    /// Starts a session at the jail root
    pub fn new(username: String, ops: FileOps) -> Self {
        let current_dir = ops.jail_root().to_path_buf();
        Self {
            username,
            ops,
            current_dir,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Operations bound to this session's jail
    pub fn ops(&self) -> &FileOps {
        &self.ops
    }

    pub fn jail_root(&self) -> &Path {
        self.ops.jail_root()
    }

    /// Always the jail root or a directory beneath it
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Current directory with `/` standing for the jail root
    pub fn virtual_cwd(&self) -> String {
        self.ops.resolver().virtual_path(&self.current_dir)
    }

    /// Changes directory; on any error the current directory is unchanged
    pub fn change_directory(&mut self, target: &str) -> Result<String, NavigateError> {
        let new_dir = self.ops.change_directory(target, &self.current_dir)?;
        self.current_dir = new_dir;
        Ok(self.virtual_cwd())
    }

    /// Falls back to the jail root if the current directory disappeared.
    ///
    /// Returns true when the directory had to be reset.
    pub fn revalidate(&mut self) -> bool {
        if self.current_dir.is_dir() {
            return false;
        }
        self.current_dir = self.jail_root().to_path_buf();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::QuotaPolicy;
    use std::fs;
    use tempfile::TempDir;

    fn session() -> (TempDir, SessionContext) {
        let dir = TempDir::new().unwrap();
        let jail = dir.path().join("users").join("alice");
        fs::create_dir_all(jail.join("docs").join("old")).unwrap();
        let ops = FileOps::new(&jail, QuotaPolicy::from_megabytes(1)).unwrap();
        (dir, SessionContext::new("alice".into(), ops))
    }

    #[test]
    fn test_cd_parent_at_root_keeps_cwd() {
        let (_dir, mut session) = session();
        let before = session.current_dir().to_path_buf();

        let err = session.change_directory("..").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfJail);
        assert_eq!(session.current_dir(), before.as_path());
        assert_eq!(session.virtual_cwd(), "/");
    }

    #[test]
    fn test_cd_into_and_back_out() {
        let (_dir, mut session) = session();

        assert_eq!(session.change_directory("docs/old").unwrap(), "/docs/old");
        assert_eq!(session.change_directory("..").unwrap(), "/docs");
        assert_eq!(session.change_directory("/").unwrap(), "/");
    }

    #[test]
    fn test_cd_missing_keeps_cwd() {
        let (_dir, mut session) = session();
        session.change_directory("docs").unwrap();

        let err = session.change_directory("nowhere").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(session.virtual_cwd(), "/docs");
    }

    #[test]
    fn test_revalidate_after_removal() {
        let (_dir, mut session) = session();
        session.change_directory("docs/old").unwrap();
        fs::remove_dir_all(session.jail_root().join("docs")).unwrap();

        assert!(session.revalidate());
        assert_eq!(session.virtual_cwd(), "/");
        assert!(!session.revalidate());
    }
}
