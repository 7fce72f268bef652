//! CLI definitions for tasknotify.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tasknotify CLI.
#[derive(Parser)]
#[command(name = "tasknotify")]
#[command(about = "Real-time task notifications over WebSocket and email")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the notification hub in foreground
    Serve {
        /// Host to bind (overrides [hub].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides [hub].port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Connect to a hub and log every notification
    Listen {
        /// Identity token sent as the `token` query parameter
        #[arg(long, env = "TASKNOTIFY_TOKEN")]
        token: String,

        /// Page origin to derive the socket address from (overrides [client].origin)
        #[arg(long)]
        origin: Option<String>,
    },

    /// Load and validate the configuration file
    CheckConfig,
}
