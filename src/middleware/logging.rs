//! Logging middleware
//!
//! Audit logging for sessions and commands.

use log::info;
use std::path::Path;

/// Log a successful login
pub fn log_session_start(user: &str, jail_root: &Path) {
    info!("Session opened for {} (jail {})", user, jail_root.display());
}

/// Log a logout or exit
pub fn log_session_end(user: &str) {
    info!("Session closed for {}", user);
}

/// Log a console command
pub fn log_command(user: &str, command: &str) {
    info!("[{}] executed: {}", user, command);
}
