//! Authentication validator
//!
//! Input checks for usernames and credentials, and credential comparison.

use crate::error::AuthError;

/// Longest accepted credential, independent of the username limit
pub const MAX_CREDENTIAL_LENGTH: usize = 128;

/// Performs basic input sanitation to check for malicious or malformed input.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Validates a username. It becomes a directory name, so anything that could
/// change the directory it names is refused.
pub fn validate_username(username: &str, max_length: usize) -> Result<(), AuthError> {
    if !is_valid_input(username, max_length) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }

    if username == "."
        || username == ".."
        || username.contains(['/', '\\', ':'])
        || username.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }

    Ok(())
}

/// Validates the shape of a credential before it is stored or compared
pub fn validate_credential(credential: &str) -> Result<(), AuthError> {
    if !is_valid_input(credential, MAX_CREDENTIAL_LENGTH) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }
    Ok(())
}

/// Exact plaintext comparison
pub fn credentials_match(stored: &str, provided: &str) -> bool {
    stored == provided
}
