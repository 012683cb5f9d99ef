//! Error handlers
//!
//! Logs errors at a level matching their kind.

use crate::error::types::{ErrorKind, SandboxError};
use log::{error, info, warn};

/// Log a sandbox error and return its kind
pub fn handle_error(user: &str, err: &SandboxError) -> ErrorKind {
    let kind = err.kind();
    match kind {
        ErrorKind::OutOfJail | ErrorKind::InvalidCredential => {
            warn!("[{}] rejected ({}): {}", user, kind, err)
        }
        ErrorKind::IoFailure => error!("[{}] failed ({}): {}", user, kind, err),
        _ => info!("[{}] refused ({}): {}", user, kind, err),
    }
    kind
}
