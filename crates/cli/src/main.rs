//! `mc`: command-line client for the master.
//!
//! Usage:
//!   mc --master 10.0.0.1:19998 ls /data
//!   MC_CONFIG=/etc/mc.toml mc capacity
//!
//! Env vars:
//!   MC_CONFIG  config file path (default: "mc.toml")
//!   RUST_LOG   log filter (default: "warn")

mod cli;

use clap::Parser;
use mc_client::MasterClient;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_cli_tracing();

    let cli = Cli::parse();
    let config = cli::load_config(&cli.config, cli.master.as_deref())?;

    if let Command::Config(cmd) = &cli.command {
        match cmd {
            ConfigCommand::Validate => {
                if !cli::config::validate(&config, &cli.config) {
                    std::process::exit(1);
                }
            }
            ConfigCommand::Show => cli::config::show(&config)?,
        }
        return Ok(());
    }

    let client = MasterClient::from_config(&config)?;
    let result = cli::fs::run(&client, cli.command).await;
    client.close().await;
    result
}

/// Initialize compact stderr-only tracing.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
