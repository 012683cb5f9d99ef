//! RAX JailFS - Entry Point
//!
//! A multi-user, quota-limited file sandbox driven from an interactive console.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use rax_jailfs::Server;
use rax_jailfs::config::SandboxConfig;

#[derive(Debug, Parser)]
#[command(name = "rax-jailfs", about = "Jailed multi-user file manager console")]
struct Args {
    /// Configuration file base name (config.toml, config.json, ...)
    #[arg(long, default_value = "config")]
    config: String,

    /// User registry file, overriding `users_file` from the configuration
    #[arg(long)]
    users: Option<String>,
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut SandboxConfig) {
        if let Some(users) = &self.users {
            config.users_file = users.clone();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let (mut config, warning) = SandboxConfig::load_or_default(&args.config);
    if let Some(warning) = warning {
        println!("Warning: {}", warning);
    }
    args.apply(&mut config);

    info!("Launching sandbox console...");

    let mut server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Console I/O failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
