//! `chatwire` -- encode, decode and inspect chat wire messages.
//!
//! # Usage
//!
//! ```bash
//! # JSON to hex-encoded binary
//! chatwire encode --type ConnectServerRequest '{"userName":"alice"}'
//!
//! # Hex-encoded binary to JSON
//! chatwire decode --type chat.ConnectServerRequest 0a05616c696365
//!
//! # Structural comparison (exit code 1 when different)
//! chatwire compare --type SendMessageRequest '{}' '{"message":{}}'
//!
//! # Raw field listing, no schema needed
//! echo 0a05616c696365 | chatwire inspect
//! ```

use std::process::ExitCode;

use chatwire::commands;
use chatwire::config::{CliArgs, ToolConfig};
use clap::Parser;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ToolConfig::load(&cli.global) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr so stdout stays machine-readable.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "resolved configuration");

    match commands::run(&cli.command, &config, std::io::stdin().lock()) {
        Ok(report) => {
            println!("{}", report.output.trim_end());
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
