//! Error types
//!
//! Defines domain-specific error types for each module of the sandbox and the
//! `ErrorKind` classification the dispatcher reports to its caller.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Outcome classification shared by every core operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    OutOfJail,
    QuotaExceeded,
    AlreadyExists,
    InvalidCredential,
    InvalidInput,
    IoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::OutOfJail => "out of jail",
            ErrorKind::QuotaExceeded => "quota exceeded",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidCredential => "invalid credential",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::IoFailure => "I/O failure",
        };
        f.write_str(name)
    }
}

/// Authentication and provisioning errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid username or password")]
    InvalidCredential,
    #[error("Invalid username: {0}")]
    InvalidUsername(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("User not logged in")]
    NotLoggedIn,
    #[error("Already logged in as {0}; logout first")]
    AlreadyLoggedIn(String),
    #[error("Failed to provision directory {path}: {source}")]
    Provisioning {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("User registry I/O error: {0}")]
    RegistryIo(#[from] io::Error),
    #[error("User registry format error: {0}")]
    RegistryFormat(#[from] serde_json::Error),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AuthError::InvalidCredential => ErrorKind::InvalidCredential,
            AuthError::InvalidUsername(_)
            | AuthError::MalformedInput(_)
            | AuthError::NotLoggedIn
            | AuthError::AlreadyLoggedIn(_) => ErrorKind::InvalidInput,
            AuthError::Provisioning { .. }
            | AuthError::RegistryIo(_)
            | AuthError::RegistryFormat(_) => ErrorKind::IoFailure,
        }
    }
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Not an archive: {0}")]
    NotAnArchive(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Path is outside your directory: {0}")]
    OutOfJail(String),
    #[error("Disk quota exceeded: used {used} of {limit} bytes")]
    QuotaExceeded { used: u64, limit: u64 },
    #[error("File already exists: {0}")]
    FileAlreadyExists(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::FileNotFound(_)
            | StorageError::DirectoryNotFound(_)
            | StorageError::NotAnArchive(_) => ErrorKind::NotFound,
            StorageError::InvalidPath(_) => ErrorKind::InvalidInput,
            StorageError::OutOfJail(_) => ErrorKind::OutOfJail,
            StorageError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            StorageError::FileAlreadyExists(_) => ErrorKind::AlreadyExists,
            StorageError::IoError(_) | StorageError::Archive(_) => ErrorKind::IoFailure,
        }
    }
}

/// Navigate module errors
#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Cannot leave your directory: {0}")]
    OutOfJail(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl NavigateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NavigateError::InvalidPath(_) => ErrorKind::InvalidInput,
            NavigateError::DirectoryNotFound(_) | NavigateError::NotADirectory(_) => {
                ErrorKind::NotFound
            }
            NavigateError::OutOfJail(_) => ErrorKind::OutOfJail,
            NavigateError::IoError(_) => ErrorKind::IoFailure,
        }
    }
}

impl From<StorageError> for NavigateError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::OutOfJail(p) => NavigateError::OutOfJail(p),
            StorageError::FileNotFound(p) | StorageError::DirectoryNotFound(p) => {
                NavigateError::DirectoryNotFound(p)
            }
            StorageError::IoError(e) => NavigateError::IoError(e),
            other => NavigateError::InvalidPath(other.to_string()),
        }
    }
}

/// General sandbox error that encompasses all error types
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Navigate error: {0}")]
    Navigate(#[from] NavigateError),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl SandboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SandboxError::Auth(e) => e.kind(),
            SandboxError::Storage(e) => e.kind(),
            SandboxError::Navigate(e) => e.kind(),
            SandboxError::IoError(_) => ErrorKind::IoFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_survive_wrapping() {
        let err: SandboxError = StorageError::QuotaExceeded { used: 5, limit: 4 }.into();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);

        let err: SandboxError = AuthError::AlreadyExists("alice".into()).into();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err: SandboxError = NavigateError::OutOfJail("..".into()).into();
        assert_eq!(err.kind(), ErrorKind::OutOfJail);
    }

    #[test]
    fn test_storage_to_navigate_conversion() {
        let err: NavigateError = StorageError::OutOfJail("/x".into()).into();
        assert_eq!(err.kind(), ErrorKind::OutOfJail);

        let err: NavigateError = StorageError::FileNotFound("docs".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
