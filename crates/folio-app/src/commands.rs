//! Subcommand handlers.

use std::time::Duration;

use tracing::{info, warn};

use folio_common::{FolioError, PresenceError, Result};
use folio_config::FolioConfig;
use folio_presence::{PresenceClient, PresenceSnapshot};

use crate::settings::client_config;
use crate::view::PresenceView;

/// Stream snapshot changes to stdout until Ctrl-C.
pub async fn watch(config: &FolioConfig) -> Result<()> {
    if !config.presence.enabled {
        warn!("presence is disabled in config, nothing to watch");
        return Ok(());
    }

    let client = PresenceClient::spawn(client_config(&config.presence));
    let mut snapshots = client.subscribe();
    client.connect().await;

    print_snapshot(&client.snapshot())?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Err(PresenceError::ClientClosed.into());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_snapshot(&snapshot)?;
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupt received, disconnecting");
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}

/// Wait for the first applied state (or a failed connect), print it, exit.
pub async fn once(config: &FolioConfig, timeout_secs: u64) -> Result<()> {
    if !config.presence.enabled {
        warn!("presence is disabled in config");
        return Ok(());
    }

    let client = PresenceClient::spawn(client_config(&config.presence));
    let mut snapshots = client.subscribe();
    client.connect().await;

    let waited = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        snapshots.wait_for(|s| !s.is_loading),
    )
    .await;

    let result = match waited {
        Ok(Ok(snapshot)) => {
            let snapshot = snapshot.clone();
            print_snapshot(&snapshot)
        }
        Ok(Err(_)) => Err(PresenceError::ClientClosed.into()),
        Err(_) => Err(FolioError::Other(format!(
            "no presence state received within {timeout_secs}s"
        ))),
    };

    client.shutdown().await;
    result
}

pub fn print_config(config: &FolioConfig) {
    println!("{}", folio_config::config_to_json(config));
}

fn print_snapshot(snapshot: &PresenceSnapshot) -> Result<()> {
    let line = PresenceView::new(snapshot)
        .to_json_line()
        .map_err(|e| FolioError::Other(format!("failed to serialize snapshot: {e}")))?;
    println!("{line}");
    Ok(())
}
