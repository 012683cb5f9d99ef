//! Console protocol
//!
//! Command parsing, dispatch to the core, and response text.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::{dispatch, handle_auth_command, handle_command};
