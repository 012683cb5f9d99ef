//! Console response text
//!
//! Fixed messages and formatting helpers for command output.

use crate::storage::DirEntry;

pub const GREETING: &str =
    "File manager. Type 'register <username> <password>' or 'login <username> <password>'.";
pub const ANONYMOUS_COMMANDS: &str =
    "Commands: register <username> <password>, login <username> <password>, help, exit";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Type 'help' for a list of commands.";
pub const GOODBYE: &str = "Goodbye";
pub const COMMAND_TOO_LONG: &str = "Command too long";

pub const HELP: &str = "\
Available commands:
  ls/dir              - List the current directory
  pwd                 - Show the current directory
  mkdir <name>        - Create a directory
  rmdir <name>        - Remove a directory and its contents
  cd <name>           - Change the current directory
  create <name>       - Create an empty file
  read <name>         - Print a file
  write <name> <text> - Replace a file's content with text
  rm <name>           - Remove a file
  cp <src> <dst>      - Copy a file
  mv <src> <dst>      - Move a file
  rename <old> <new>  - Rename a file
  zip <file>          - Compress a file into <stem>.zip
  unzip <archive>     - Extract an archive here
  quota               - Show disk quota usage
  logout              - Log out
  help                - Show this help
  exit                - Quit";

/// Formats a usage hint for a verb missing arguments
pub fn usage(text: &str) -> String {
    format!("Usage: {}", text)
}

/// Formats a failure line
pub fn error(message: impl std::fmt::Display) -> String {
    format!("Error: {}", message)
}

/// One name per line; directories carry a trailing `/`
pub fn format_listing(entries: &[DirEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            if e.is_dir {
                format!("{}/", e.name)
            } else {
                e.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
