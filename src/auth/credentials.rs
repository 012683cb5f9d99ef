//! Credential storage and management
//!
//! Persists the username -> account record mapping as JSON. Credentials are
//! stored and compared in plaintext; hashing them would change the record
//! format and is left as a hardening step.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::AuthError;

/// Persisted form of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "password")]
    pub credential: String,
    #[serde(rename = "directory")]
    pub jail_root: PathBuf,
}

/// A registered user and the jail bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    pub credential: String,
    pub jail_root: PathBuf,
}

/// File-backed user registry
#[derive(Debug)]
pub struct UserRegistry {
    path: PathBuf,
    accounts: BTreeMap<String, AccountRecord>,
}

impl UserRegistry {
    /// Loads the registry from `path`.
    ///
    /// A missing or unparsable file yields an empty registry, which is written
    /// back immediately so the file exists from then on.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let accounts = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(accounts) => Some(accounts),
                Err(e) => {
                    warn!("User registry {} is corrupt ({}), starting empty", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("User registry {} not found, creating it", path.display());
                None
            }
            Err(e) => return Err(e.into()),
        };

        let fresh = accounts.is_none();
        let registry = Self {
            path: path.to_path_buf(),
            accounts: accounts.unwrap_or_default(),
        };
        if fresh {
            registry.save()?;
        }
        Ok(registry)
    }

    /// Rewrites the whole registry file
    pub fn save(&self) -> Result<(), AuthError> {
        let raw = serde_json::to_string_pretty(&self.accounts)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Option<UserAccount> {
        self.accounts.get(username).map(|record| UserAccount {
            username: username.to_string(),
            credential: record.credential.clone(),
            jail_root: record.jail_root.clone(),
        })
    }

    /// Adds an account and persists the registry. Nothing changes if saving fails.
    pub fn insert(&mut self, account: &UserAccount) -> Result<(), AuthError> {
        if self.contains(&account.username) {
            return Err(AuthError::AlreadyExists(account.username.clone()));
        }

        self.accounts.insert(
            account.username.clone(),
            AccountRecord {
                credential: account.credential.clone(),
                jail_root: account.jail_root.clone(),
            },
        );
        if let Err(e) = self.save() {
            self.accounts.remove(&account.username);
            return Err(e);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn account(name: &str, credential: &str) -> UserAccount {
        UserAccount {
            username: name.to_string(),
            credential: credential.to_string(),
            jail_root: PathBuf::from("/srv/users").join(name),
        }
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let registry = UserRegistry::load(&path).unwrap();
        assert!(registry.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
    }

    #[test]
    fn test_corrupt_file_is_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "[not valid").unwrap();

        let registry = UserRegistry::load(&path).unwrap();
        assert!(registry.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
    }

    #[test]
    fn test_records_persist_in_original_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let mut registry = UserRegistry::load(&path).unwrap();
        registry.insert(&account("alice", "pw1")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["alice"]["password"], "pw1");
        assert_eq!(raw["alice"]["directory"], "/srv/users/alice");

        let reloaded = UserRegistry::load(&path).unwrap();
        assert_eq!(reloaded.get("alice"), Some(account("alice", "pw1")));
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let dir = TempDir::new().unwrap();
        let mut registry = UserRegistry::load(&dir.path().join("users.json")).unwrap();

        registry.insert(&account("alice", "pw1")).unwrap();
        let err = registry.insert(&account("alice", "pw2")).unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists(_)));
        assert_eq!(registry.get("alice").unwrap().credential, "pw1");
        assert_eq!(registry.len(), 1);
    }
}
