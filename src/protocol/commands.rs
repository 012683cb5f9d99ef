//! Module `command`
//!
//! Defines the console command set, its parser, and the result structure
//! returned by command handlers.

use crate::error::ErrorKind;

/// Represents a command parsed from a console line.
///
/// Each variant corresponds to one verb. Verbs missing a required argument
/// parse to `Usage` so the core is never invoked with partial input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Register(String, String),
    Login(String, String),
    Logout,
    List,
    Pwd,
    Mkdir(String),
    Rmdir(String),
    Cd(String),
    Create(String),
    Read(String),
    Write(String, String),
    Rm(String),
    Cp(String, String),
    Mv(String, String),
    Rename(String, String),
    Zip(String),
    Unzip(String),
    Quota,
    Help,
    Exit,
    Empty,
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Loggable form of the command with credentials redacted
    pub fn describe(&self) -> String {
        match self {
            Command::Register(user, _) => format!("register {} ***", user),
            Command::Login(user, _) => format!("login {} ***", user),
            Command::Write(name, text) => format!("write {} ({} bytes)", name, text.len()),
            Command::Unknown(verb) => format!("unknown '{}'", verb),
            Command::Usage(_) => "usage".to_string(),
            other => format!("{:?}", other).to_lowercase(),
        }
    }
}

/// Represents the outcome status of executing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure(ErrorKind),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure(kind),
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
        }
    }
}

/// Parses a raw console line into the `Command` enum.
///
/// The verb is case-insensitive; arguments are whitespace separated. For
/// `write`, everything after the file name is joined with single spaces.
pub fn parse_command(raw: &str) -> Command {
    let mut parts = raw.split_whitespace();
    let Some(verb) = parts.next() else {
        return Command::Empty;
    };
    let args: Vec<String> = parts.map(str::to_string).collect();

    let one = |usage: &'static str, make: fn(String) -> Command| match args.first() {
        Some(a) => make(a.clone()),
        None => Command::Usage(usage),
    };
    let two = |usage: &'static str, make: fn(String, String) -> Command| match &args[..] {
        [a, b, ..] => make(a.clone(), b.clone()),
        _ => Command::Usage(usage),
    };

    match verb.to_ascii_lowercase().as_str() {
        "register" => two("register <username> <password>", Command::Register),
        "login" => two("login <username> <password>", Command::Login),
        "logout" => Command::Logout,
        "ls" | "dir" => Command::List,
        "pwd" => Command::Pwd,
        "mkdir" => one("mkdir <name>", Command::Mkdir),
        "rmdir" => one("rmdir <name>", Command::Rmdir),
        "cd" => one("cd <name>", Command::Cd),
        "create" => one("create <name>", Command::Create),
        "read" => one("read <name>", Command::Read),
        "write" => match &args[..] {
            [name, text @ ..] if !text.is_empty() => Command::Write(name.clone(), text.join(" ")),
            _ => Command::Usage("write <name> <text>"),
        },
        "rm" => one("rm <name>", Command::Rm),
        "cp" => two("cp <src> <dst>", Command::Cp),
        "mv" => two("mv <src> <dst>", Command::Mv),
        "rename" => two("rename <old> <new>", Command::Rename),
        "zip" => one("zip <file>", Command::Zip),
        "unzip" => one("unzip <archive>", Command::Unzip),
        "quota" => Command::Quota,
        "help" => Command::Help,
        "exit" => Command::Exit,
        other => Command::Unknown(other.to_string()),
    }
}
