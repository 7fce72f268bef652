//! `listen` command: a client that logs what it receives.

use tracing::{error, info};

use tasknotify_client::{ConnectionState, NotificationClient};
use tasknotify_config::Config;
use tasknotify_protocols::Notification;

use crate::adapters::client_config;

/// Connect as `token` and log notifications until Ctrl-C or the retry cap.
pub(crate) async fn run_listen(
    config: Config,
    token: String,
    origin: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = NotificationClient::new(client_config(&config.client, origin));

    let _subscription = client.subscribe(|n: &Notification| {
        info!(
            "[{}] task {} \"{}\": {}",
            n.kind(),
            n.task_id(),
            n.task_title(),
            n.message()
        );
    });

    let mut state = client.watch_state();
    client.connect(&token)?;
    info!("Listening as {} on {}", token, client.config().origin);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                info!("Connection {}", current);
                if current == ConnectionState::Exhausted {
                    error!("Hub unreachable, giving up");
                    break;
                }
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
