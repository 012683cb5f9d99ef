use log::{info, warn};
use std::fs;
use tokio::io::BufReader;

use crate::auth::UserRegistry;
use crate::client::handle_client;
use crate::config::SandboxConfig;
use crate::error::SandboxError;

/// Process host: owns the configuration and the user registry and serves
/// the console on stdin/stdout.
pub struct Server {
    registry: UserRegistry,
    config: SandboxConfig,
}

impl Server {
    /// Prepares the root directory and loads the user registry.
    pub fn new(mut config: SandboxConfig) -> Result<Self, SandboxError> {
        let root = config.root_path();
        if !root.exists() {
            fs::create_dir_all(&root)?;
            info!("Created root directory: {}", root.display());
        }

        match root.canonicalize() {
            Ok(canonical) => config.root_directory = canonical.to_string_lossy().to_string(),
            Err(e) => warn!("Could not canonicalize root {}: {}", root.display(), e),
        }
        info!(
            "Root directory: {} (quota {} MB per user)",
            config.root_directory, config.quota_mb
        );

        let registry = UserRegistry::load(&config.users_path())?;
        info!(
            "Loaded {} user(s) from {}",
            registry.len(),
            registry.path().display()
        );

        Ok(Self { registry, config })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Serves the interactive console until `exit` or end of input.
    pub async fn start(&mut self) -> std::io::Result<()> {
        info!("Starting RAX JailFS console");

        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        handle_client(reader, writer, &mut self.registry, &self.config).await
    }
}
