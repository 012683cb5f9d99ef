//! Command handlers module for the RAX JailFS console.
//!
//! This module defines handler functions for console commands, mapping each
//! verb onto the core operation that implements it and turning the typed
//! outcome into a `CommandResult`. No handler panics or aborts the session:
//! every error becomes a `Failure` carrying its `ErrorKind`.

use crate::auth::{self, UserRegistry};
use crate::client::operations::{process_logout, process_quit};
use crate::client::{Client, SessionContext};
use crate::config::SandboxConfig;
use crate::error::handlers::handle_error;
use crate::error::{AuthError, ErrorKind, SandboxError};
use crate::middleware::logging::log_session_start;
use crate::protocol::responses;
use crate::protocol::{Command, CommandResult, CommandStatus};

/// Converts any core error into a failure result, logging it on the way.
fn fail(user: &str, err: impl Into<SandboxError>) -> CommandResult {
    let err = err.into();
    let kind = handle_error(user, &err);
    CommandResult::failure(kind, responses::error(&err))
}

/// Dispatches a parsed command according to the client's login state.
///
/// # Arguments
///
/// * `client` - Mutable reference to the console client.
/// * `command` - Reference to the parsed command.
/// * `registry` - Mutable reference to the user registry.
/// * `config` - Effective sandbox configuration.
pub fn dispatch(
    client: &mut Client,
    command: &Command,
    registry: &mut UserRegistry,
    config: &SandboxConfig,
) -> CommandResult {
    match command {
        Command::Empty => CommandResult::silent(),
        Command::Usage(text) => {
            CommandResult::failure(ErrorKind::InvalidInput, responses::usage(text))
        }
        Command::Help if client.is_logged_in() => CommandResult::success(responses::HELP),
        Command::Help => CommandResult::success(responses::ANONYMOUS_COMMANDS),
        Command::Exit => handle_cmd_exit(client),
        _ if client.is_logged_in() => handle_command(client, command),
        _ => handle_auth_command(client, command, registry, config),
    }
}

/// Handles commands available before login.
pub fn handle_auth_command(
    client: &mut Client,
    command: &Command,
    registry: &mut UserRegistry,
    config: &SandboxConfig,
) -> CommandResult {
    match command {
        Command::Register(username, password) => {
            handle_cmd_register(registry, config, username, password)
        }
        Command::Login(username, password) => {
            handle_cmd_login(client, registry, config, username, password)
        }
        _ => CommandResult::failure(ErrorKind::InvalidInput, responses::ANONYMOUS_COMMANDS),
    }
}

/// Handles commands of an authenticated session.
pub fn handle_command(client: &mut Client, command: &Command) -> CommandResult {
    if let Command::Logout = command {
        return handle_cmd_logout(client);
    }

    let Some(session) = client.session_mut() else {
        return fail("-", AuthError::NotLoggedIn);
    };

    match command {
        Command::Register(..) | Command::Login(..) => fail(
            session.username(),
            AuthError::AlreadyLoggedIn(session.username().to_string()),
        ),
        Command::List => handle_cmd_list(session),
        Command::Pwd => CommandResult::success(session.virtual_cwd()),
        Command::Mkdir(name) => handle_cmd_mkdir(session, name),
        Command::Rmdir(name) => handle_cmd_rmdir(session, name),
        Command::Cd(target) => handle_cmd_cd(session, target),
        Command::Create(name) => handle_cmd_create(session, name),
        Command::Read(name) => handle_cmd_read(session, name),
        Command::Write(name, text) => handle_cmd_write(session, name, text),
        Command::Rm(name) => handle_cmd_rm(session, name),
        Command::Cp(src, dst) => handle_cmd_cp(session, src, dst),
        Command::Mv(src, dst) => handle_cmd_mv(session, src, dst),
        Command::Rename(old, new) => handle_cmd_rename(session, old, new),
        Command::Zip(name) => handle_cmd_zip(session, name),
        Command::Unzip(name) => handle_cmd_unzip(session, name),
        Command::Quota => CommandResult::success(session.ops().quota().summary()),
        Command::Unknown(_) => {
            CommandResult::failure(ErrorKind::InvalidInput, responses::UNKNOWN_COMMAND)
        }
        Command::Logout | Command::Help | Command::Exit | Command::Empty | Command::Usage(_) => {
            CommandResult::silent()
        }
    }
}

/// Handles the REGISTER command: provisions a jail and records the account.
fn handle_cmd_register(
    registry: &mut UserRegistry,
    config: &SandboxConfig,
    username: &str,
    password: &str,
) -> CommandResult {
    match auth::register(registry, config, username, password) {
        Ok(account) => CommandResult::success(format!("User {} registered", account.username)),
        Err(e) => fail("-", e),
    }
}

/// Handles the LOGIN command: authenticates and attaches a session.
fn handle_cmd_login(
    client: &mut Client,
    registry: &UserRegistry,
    config: &SandboxConfig,
    username: &str,
    password: &str,
) -> CommandResult {
    match auth::authenticate(registry, config, username, password) {
        Ok(session) => {
            log_session_start(session.username(), session.jail_root());
            let message = format!("Logged in: {}", session.username());
            client.login(session);
            CommandResult::success(message)
        }
        Err(e) => fail("-", e),
    }
}

/// Handles the LOGOUT command.
fn handle_cmd_logout(client: &mut Client) -> CommandResult {
    match process_logout(client) {
        Ok(_) => CommandResult::success("Logged out"),
        Err(e) => fail("-", e),
    }
}

/// Handles the EXIT command: closes any session and ends the loop.
fn handle_cmd_exit(client: &mut Client) -> CommandResult {
    process_quit(client);
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some(responses::GOODBYE.into()),
    }
}

fn handle_cmd_list(session: &SessionContext) -> CommandResult {
    match session.ops().list(session.current_dir()) {
        Ok(entries) if entries.is_empty() => CommandResult::silent(),
        Ok(entries) => CommandResult::success(responses::format_listing(&entries)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_mkdir(session: &SessionContext, name: &str) -> CommandResult {
    match session.ops().mkdir(name, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("Directory {} created", name)),
        Err(e) => fail(session.username(), e),
    }
}

/// Handles RMDIR; the session falls back to the jail root if its current
/// directory was inside the removed tree.
fn handle_cmd_rmdir(session: &mut SessionContext, name: &str) -> CommandResult {
    let result = session.ops().rmdir(name, session.current_dir());
    match result {
        Ok(_) => {
            if session.revalidate() {
                CommandResult::success(format!(
                    "Directory {} removed; current directory reset to /",
                    name
                ))
            } else {
                CommandResult::success(format!("Directory {} removed", name))
            }
        }
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_cd(session: &mut SessionContext, target: &str) -> CommandResult {
    match session.change_directory(target) {
        Ok(cwd) => CommandResult::success(format!("Current directory: {}", cwd)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_create(session: &SessionContext, name: &str) -> CommandResult {
    match session.ops().create_file(name, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("File {} created", name)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_read(session: &SessionContext, name: &str) -> CommandResult {
    match session.ops().read_file(name, session.current_dir()) {
        Ok(content) => CommandResult::success(content),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_write(session: &SessionContext, name: &str, text: &str) -> CommandResult {
    match session.ops().write_file(name, text, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("Text written to file {}", name)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_rm(session: &SessionContext, name: &str) -> CommandResult {
    match session.ops().remove_file(name, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("File {} removed", name)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_cp(session: &SessionContext, src: &str, dst: &str) -> CommandResult {
    match session.ops().copy_file(src, dst, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("File {} copied to {}", src, dst)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_mv(session: &SessionContext, src: &str, dst: &str) -> CommandResult {
    match session.ops().move_file(src, dst, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("File {} moved to {}", src, dst)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_rename(session: &SessionContext, old: &str, new: &str) -> CommandResult {
    match session.ops().rename_file(old, new, session.current_dir()) {
        Ok(_) => CommandResult::success(format!("File {} renamed to {}", old, new)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_zip(session: &SessionContext, name: &str) -> CommandResult {
    match session.ops().archive(name, session.current_dir()) {
        Ok(archive) => CommandResult::success(format!("File {} archived to {}", name, archive)),
        Err(e) => fail(session.username(), e),
    }
}

fn handle_cmd_unzip(session: &SessionContext, name: &str) -> CommandResult {
    match session.ops().unarchive(name, session.current_dir()) {
        Ok(result) => CommandResult::success(format!(
            "Archive {} extracted ({} entries, {} bytes)",
            name, result.entries, result.bytes
        )),
        Err(e) => fail(session.username(), e),
    }
}
