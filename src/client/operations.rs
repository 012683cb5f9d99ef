//! Client operations
//!
//! Handles session lifecycle operations.

use crate::client::Client;
use crate::error::AuthError;
use crate::middleware::logging::log_session_end;

/// Handles client logout, returning the name of the user that left
pub fn process_logout(client: &mut Client) -> Result<String, AuthError> {
    match client.logout() {
        Some(session) => {
            log_session_end(session.username());
            Ok(session.username().to_string())
        }
        None => Err(AuthError::NotLoggedIn),
    }
}

/// Handles console exit; any open session is closed first
pub fn process_quit(client: &mut Client) {
    if let Some(session) = client.logout() {
        log_session_end(session.username());
    }
}
