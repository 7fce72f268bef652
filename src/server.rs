//! Tracing setup and the `serve` command.

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tasknotify_config::{Config, LoggingConfig};
use tasknotify_hub::NotificationHub;

use crate::adapters::log_dir;

/// Initialize tracing with console and, if enabled, daily-rotated file output.
///
/// `RUST_LOG` wins over the configured level.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer().with_target(true).with_ansi(true);

    if !logging.file {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .init();
        return Ok(());
    }

    let dir = log_dir(logging);
    std::fs::create_dir_all(&dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tasknotify")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes buffered lines on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Run the notification hub until Ctrl-C.
pub(crate) async fn run_server(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = host {
        config.hub.host = host;
    }
    if let Some(port) = port {
        config.hub.port = port;
    }

    info!("Starting tasknotify hub v{}", env!("CARGO_PKG_VERSION"));
    if !config.email.enabled {
        info!("Email dispatch disabled");
    }

    let hub = NotificationHub::new(config.hub);
    let addr = hub.start().await?;
    info!("Health check at http://{}/health", addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");

    hub.stop().await;
    Ok(())
}
