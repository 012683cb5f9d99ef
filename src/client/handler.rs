use log::{error, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::auth::UserRegistry;
use crate::client::Client;
use crate::config::SandboxConfig;
use crate::middleware::logging::log_command;
use crate::protocol::{CommandStatus, dispatch, parse_command, responses};

async fn send<W>(writer: &mut W, message: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(message.as_bytes()).await?;
    if !message.ends_with('\n') {
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

/// Runs the console session loop.
///
/// - Reads one command line at a time and runs it to completion.
/// - Dispatches commands using `dispatch`; command errors are reported and
///   the loop continues.
/// - Returns on `exit` or end of input. Only I/O errors on the console
///   streams themselves end the loop early.
pub async fn handle_client<R, W>(
    mut reader: R,
    mut writer: W,
    registry: &mut UserRegistry,
    config: &SandboxConfig,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut client = Client::default();
    let mut line = String::new();

    send(&mut writer, responses::GREETING).await?;

    loop {
        writer.write_all(client.prompt().as_bytes()).await?;
        writer.flush().await?;

        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Console input closed");
                break;
            }
            Ok(_) => {
                // Enforce command length limit
                if line.len() > config.max_command_length {
                    send(&mut writer, responses::COMMAND_TOO_LONG).await?;
                    continue;
                }

                let command = parse_command(line.trim_end_matches(['\r', '\n']));
                log_command(client.log_name(), &command.describe());

                let result = dispatch(&mut client, &command, registry, config);
                if let Some(msg) = result.message.as_deref() {
                    send(&mut writer, msg).await?;
                }

                if result.status == CommandStatus::CloseConnection {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                send(&mut writer, &responses::error("input is not valid UTF-8")).await?;
            }
            Err(e) => {
                error!("Failed to read console input: {}", e);
                return Err(e);
            }
        }
    }

    writer.flush().await?;
    if let Some(session) = client.logout() {
        info!("Session for {} ended with input", session.username());
    }
    Ok(())
}
