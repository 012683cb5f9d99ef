//! Configuration management for RAX JailFS
//!
//! Loads the sandbox configuration from a file with environment overrides.
//! A missing or malformed configuration never aborts startup: the loader
//! falls back to the defaults and reports a warning instead.

use config::{Config, Environment, File};
use log::warn;
use serde::Deserialize;
use std::path::PathBuf;

use crate::storage::quota::QuotaPolicy;

/// Default per-user quota in megabytes
pub const DEFAULT_QUOTA_MB: u64 = 10;

/// Default location of the persisted user registry
pub const DEFAULT_USERS_FILE: &str = "users.json";

/// Prefix for environment overrides, e.g. `RAX_JAIL_QUOTA_MB=5`
const ENV_PREFIX: &str = "RAX_JAIL";

/// Complete sandbox configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SandboxConfig {
    /// Base directory for all jails; `users/<name>` lives under it
    pub root_directory: String,

    /// Per-user storage budget in megabytes
    #[serde(default = "default_quota_mb")]
    pub quota_mb: u64,

    /// JSON file holding the user registry
    #[serde(default = "default_users_file")]
    pub users_file: String,

    /// Project declared archive sizes and abort extraction on overflow
    #[serde(default)]
    pub strict_archive_quota: bool,

    /// Security limits
    #[serde(default = "default_max_username_length")]
    pub max_username_length: usize,
    #[serde(default = "default_max_command_length")]
    pub max_command_length: usize,
}

fn default_root_directory() -> String {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}

fn default_quota_mb() -> u64 {
    DEFAULT_QUOTA_MB
}

fn default_users_file() -> String {
    DEFAULT_USERS_FILE.to_string()
}

fn default_max_username_length() -> usize {
    32
}

fn default_max_command_length() -> usize {
    4096
}

impl Default for SandboxConfig {
    /// Fallback configuration: current working directory, 10 MB quota
    fn default() -> Self {
        Self {
            root_directory: default_root_directory(),
            quota_mb: DEFAULT_QUOTA_MB,
            users_file: default_users_file(),
            strict_archive_quota: false,
            max_username_length: default_max_username_length(),
            max_command_length: default_max_command_length(),
        }
    }
}

impl SandboxConfig {
    /// Load configuration from `<base>.{toml,json,...}` with environment overrides
    pub fn load(base: &str) -> Result<Self, config::ConfigError> {
        Self::build(Some(base), Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration, falling back to defaults on any failure.
    ///
    /// Returns the effective configuration and, when the fallback was taken,
    /// a warning suitable for showing to the console user.
    pub fn load_or_default(base: &str) -> (Self, Option<String>) {
        Self::load_or_default_from(base, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like `load_or_default`, reading overrides from `env`.
    ///
    /// Environment overrides still apply on top of the defaults when the file
    /// is missing or unusable.
    pub fn load_or_default_from(base: &str, env: Environment) -> (Self, Option<String>) {
        match Self::build(Some(base), env.clone()) {
            Ok(config) => (config, None),
            Err(e) => {
                let fallback = Self::build(None, env).unwrap_or_default();
                let message = format!(
                    "Failed to load configuration '{}': {}. Using {} with a {} MB quota.",
                    base, e, fallback.root_directory, fallback.quota_mb
                );
                warn!("{}", message);
                (fallback, Some(message))
            }
        }
    }

    fn build(base: Option<&str>, env: Environment) -> Result<Self, config::ConfigError> {
        let mut builder =
            Config::builder().set_default("root_directory", default_root_directory())?;
        if let Some(base) = base {
            builder = builder.add_source(File::with_name(base));
        }

        let settings = builder.add_source(env.try_parsing(true)).build()?;
        let config: SandboxConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.root_directory.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "root_directory cannot be empty".into(),
            ));
        }

        if self.quota_mb == 0 {
            return Err(config::ConfigError::Message(
                "quota_mb must be greater than 0".into(),
            ));
        }

        if self.users_file.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "users_file cannot be empty".into(),
            ));
        }

        if self.max_username_length == 0 || self.max_command_length == 0 {
            return Err(config::ConfigError::Message(
                "length limits must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get root directory as PathBuf
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root_directory)
    }

    /// Get the registry file as PathBuf
    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.users_file)
    }

    /// Per-jail byte limit derived from `quota_mb`
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy::from_megabytes(self.quota_mb)
    }
}
