pub mod config;
pub mod fs;

use clap::{Parser, Subcommand};
use mc_domain::ClientConfig;

/// Command-line client for the master.
#[derive(Debug, Parser)]
#[command(name = "mc", version, about)]
pub struct Cli {
    /// Path to the config file.
    #[arg(long, env = "MC_CONFIG", default_value = "mc.toml", global = true)]
    pub config: String,

    /// Talk to this `host:port` directly, ignoring leader discovery.
    #[arg(long, global = true)]
    pub master: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show metadata of a file or folder.
    Stat { path: String },
    /// List a folder.
    Ls { path: String },
    /// Create a folder.
    Mkdir {
        path: String,
        /// Create missing parents too.
        #[arg(short, long)]
        recursive: bool,
    },
    /// Delete a file or folder.
    Rm {
        path: String,
        /// Delete non-empty folders.
        #[arg(short, long)]
        recursive: bool,
    },
    /// Rename a file or folder.
    Mv { src: String, dst: String },
    /// Pin a file in worker memory.
    Pin { path: String },
    /// Unpin a file.
    Unpin { path: String },
    /// List workers known to the master.
    Workers,
    /// Show cluster capacity and usage.
    Capacity,
    /// Connect and print the session id.
    Session,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the config at `path`, or defaults when the file does not exist.
/// `--master` overrides both the static address and leader discovery.
pub fn load_config(path: &str, master: Option<&str>) -> anyhow::Result<ClientConfig> {
    let mut config = if std::path::Path::new(path).exists() {
        ClientConfig::load(path)?
    } else {
        tracing::debug!(path, "config file not found, using defaults");
        ClientConfig::default()
    };

    if let Some(master) = master {
        config.master.address = Some(master.to_string());
        config.leader.enabled = false;
    }

    Ok(config)
}
