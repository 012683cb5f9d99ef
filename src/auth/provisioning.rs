//! User directory provisioning
//!
//! Registration creates `<root>/users/<username>` and records the account;
//! authentication turns a matching account into a `SessionContext`.

use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::auth::credentials::{UserAccount, UserRegistry};
use crate::auth::validator::{credentials_match, validate_credential, validate_username};
use crate::client::SessionContext;
use crate::config::SandboxConfig;
use crate::error::AuthError;
use crate::storage::FileOps;

/// Directory under the root that holds every jail
pub const USERS_DIR: &str = "users";

fn provision_jail(path: &Path) -> Result<(), AuthError> {
    fs::create_dir_all(path).map_err(|source| AuthError::Provisioning {
        path: path.to_path_buf(),
        source,
    })
}

/// Registers a new user, creating its jail directory if absent
pub fn register(
    registry: &mut UserRegistry,
    config: &SandboxConfig,
    username: &str,
    credential: &str,
) -> Result<UserAccount, AuthError> {
    validate_username(username, config.max_username_length)?;
    validate_credential(credential)?;

    if registry.contains(username) {
        return Err(AuthError::AlreadyExists(username.to_string()));
    }

    let jail = config.root_path().join(USERS_DIR).join(username);
    provision_jail(&jail)?;
    let jail_root = jail.canonicalize().map_err(|source| AuthError::Provisioning {
        path: jail.clone(),
        source,
    })?;

    let account = UserAccount {
        username: username.to_string(),
        credential: credential.to_string(),
        jail_root,
    };
    registry.insert(&account)?;

    info!("Registered user {} with jail {}", username, account.jail_root.display());
    Ok(account)
}

/// Checks the credential and opens a session rooted at the user's jail
pub fn authenticate(
    registry: &UserRegistry,
    config: &SandboxConfig,
    username: &str,
    credential: &str,
) -> Result<SessionContext, AuthError> {
    let account = registry
        .get(username)
        .filter(|account| credentials_match(&account.credential, credential))
        .ok_or_else(|| {
            warn!("Failed login for user {}", username);
            AuthError::InvalidCredential
        })?;

    if !account.jail_root.is_dir() {
        warn!(
            "Jail {} for {} is missing, re-provisioning",
            account.jail_root.display(),
            username
        );
        provision_jail(&account.jail_root)?;
    }

    let ops = FileOps::new(&account.jail_root, config.quota_policy())
        .map_err(|source| AuthError::Provisioning {
            path: account.jail_root.clone(),
            source,
        })?
        .with_strict_archive_quota(config.strict_archive_quota);

    info!("User {} logged in", username);
    Ok(SessionContext::new(username.to_string(), ops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SandboxConfig, UserRegistry) {
        let dir = TempDir::new().unwrap();
        let config = SandboxConfig {
            root_directory: dir.path().join("root").to_string_lossy().to_string(),
            quota_mb: 1,
            users_file: dir.path().join("users.json").to_string_lossy().to_string(),
            ..SandboxConfig::default()
        };
        let registry = UserRegistry::load(&config.users_path()).unwrap();
        (dir, config, registry)
    }

    #[test]
    fn test_register_creates_jail() {
        let (_dir, config, mut registry) = setup();

        let account = register(&mut registry, &config, "alice", "pw1").unwrap();
        assert!(account.jail_root.is_dir());
        assert!(account.jail_root.ends_with("users/alice"));
    }

    #[test]
    fn test_second_registration_fails_and_keeps_credential() {
        let (_dir, config, mut registry) = setup();

        register(&mut registry, &config, "alice", "pw1").unwrap();
        let err = register(&mut registry, &config, "alice", "pw2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        assert!(authenticate(&registry, &config, "alice", "pw1").is_ok());
        let err = authenticate(&registry, &config, "alice", "pw2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
    }

    #[test]
    fn test_unknown_user_is_invalid_credential() {
        let (_dir, config, registry) = setup();

        let err = authenticate(&registry, &config, "ghost", "pw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
    }

    #[test]
    fn test_traversal_username_is_refused() {
        let (dir, config, mut registry) = setup();

        assert!(register(&mut registry, &config, "..", "pw").is_err());
        assert!(register(&mut registry, &config, "../../evil", "pw").is_err());
        assert!(!dir.path().join("evil").exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_session_starts_at_jail_root() {
        let (_dir, config, mut registry) = setup();
        let account = register(&mut registry, &config, "alice", "pw1").unwrap();

        let session = authenticate(&registry, &config, "alice", "pw1").unwrap();
        assert_eq!(session.username(), "alice");
        assert_eq!(session.current_dir(), account.jail_root.as_path());
        assert_eq!(session.ops().policy().limit(), 1024 * 1024);
    }

    #[test]
    fn test_missing_jail_is_reprovisioned_on_login() {
        let (_dir, config, mut registry) = setup();
        let account = register(&mut registry, &config, "alice", "pw1").unwrap();
        fs::remove_dir_all(&account.jail_root).unwrap();

        authenticate(&registry, &config, "alice", "pw1").unwrap();
        assert!(account.jail_root.is_dir());
    }
}
