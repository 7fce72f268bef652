//! tasknotify - real-time task notifications
//!
//! Entry point for the hub server, the listening client and config checks.

mod adapters;
mod cli;
mod cmd_listen;
mod server;

use clap::Parser;
use tracing::{info, warn};

use tasknotify_config::{Config, ConfigLoader, ConfigValidator};

use cli::{Cli, Commands};
use cmd_listen::run_listen;
use server::{init_tracing, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve { host, port } => {
            check_config(&config)?;
            run_server(config, host, port).await
        }
        Commands::Listen { token, origin } => run_listen(config, token, origin).await,
        Commands::CheckConfig => {
            check_config(&config)?;
            adapters::email_notifier(&config.email)?;
            info!("Configuration OK: {}", cli.config.display());
            Ok(())
        }
    }
}

/// Validate, log every finding, and fail on the first error.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);
    for error in &result.errors {
        tracing::error!("{}: {}", error.path, error.message);
    }
    for warning in result.into_result()? {
        warn!("{}: {}", warning.path, warning.message);
    }
    Ok(())
}
