// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ethere - two-party contract agreement service.
//!
//! This is the binary entry point for the Ethere HTTP service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ethere_config::{ConfigError, EthereConfig};

/// Ethere - two-party contract agreement service.
#[derive(Parser, Debug)]
#[command(name = "ethere", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP service.
    Serve,
    /// Validate configuration and print the effective settings.
    Config,
}

fn load(path: Option<&PathBuf>) -> Result<EthereConfig, Vec<ConfigError>> {
    match path {
        Some(path) => ethere_config::load_and_validate_path(path),
        None => ethere_config::load_and_validate(),
    }
}

/// Copy of `config` with secrets masked, for display.
fn redacted(config: &EthereConfig) -> EthereConfig {
    let mut shown = config.clone();
    if shown.gateway.bearer_token.is_some() {
        shown.gateway.bearer_token = Some("[redacted]".to_string());
    }
    if shown.notarization.api_key.is_some() {
        shown.notarization.api_key = Some("[redacted]".to_string());
    }
    shown
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            ethere_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&redacted(&config)) {
            Ok(rendered) => {
                eprintln!("ethere: configuration is valid");
                print!("{rendered}");
            }
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("ethere: use --help for available commands");
        }
    }
}
