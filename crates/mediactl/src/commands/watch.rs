//! Watch command: follow the live event stream until interrupted.

use std::sync::Arc;

use tokio::sync::broadcast;

use mediactl_core::{ConnectionState, EventStreamClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::notifier::TermNotifier;
use crate::output;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let server_config = crate::config::build_server_config(global)?;
    let notifier = Arc::new(TermNotifier::new(
        output::should_color(&global.color),
        global.quiet,
    ));

    let client = EventStreamClient::new(notifier);
    client.connect(&server_config).await?;

    let mut state = client.connection_state();
    let mut memory = client.memory();
    let mut message = client.message();
    let mut reloadable = client.reloadable();
    let mut config_updates = client.config_updates();

    let quiet = global.quiet;
    status_line(quiet, &format!("watching {} (ctrl-c to stop)", server_config.url));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() { break; }
                let current = *state.borrow_and_update();
                status_line(quiet, state_label(current));
            }
            changed = memory.changed() => {
                if changed.is_err() { break; }
                let snapshot = *memory.borrow_and_update();
                status_line(
                    quiet,
                    &format!(
                        "memory {}/{} MiB (buffer {} MiB)",
                        snapshot.used, snapshot.max, snapshot.buffer
                    ),
                );
            }
            changed = message.changed() => {
                if changed.is_err() { break; }
                let text = message.borrow_and_update().clone();
                if let Some(text) = text {
                    status_line(quiet, &text);
                }
            }
            changed = reloadable.changed() => {
                if changed.is_err() { break; }
                if *reloadable.borrow_and_update() {
                    status_line(quiet, "the server needs a restart to apply changes");
                }
            }
            update = config_updates.recv() => {
                match update {
                    Ok(changed_settings) => {
                        let keys: Vec<&str> =
                            changed_settings.keys().map(String::as_str).collect();
                        status_line(
                            quiet,
                            &format!("settings changed elsewhere: {}", keys.join(", ")),
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    client.disconnect().await;
    status_line(quiet, "stopped");
    Ok(())
}

fn state_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Disconnected => "disconnected",
        ConnectionState::Connecting => "connecting...",
        ConnectionState::Connected => "connected",
        ConnectionState::Error => "connection lost, retrying",
    }
}

/// One timestamped line per update, on stdout.
fn status_line(quiet: bool, text: &str) {
    if quiet {
        return;
    }
    println!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), text);
}
