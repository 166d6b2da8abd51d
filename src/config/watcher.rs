//! Configuration file watcher for hot reload.
//!
//! Only the mode policy (failure threshold, operational window) is applied
//! live. Other sections are read at startup; changing them needs a restart.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::config::loader::load_config;
use crate::config::schema::{ConnectivityConfig, LinkConfig};
use crate::connectivity::{ControllerRegistry, ModePolicy};

/// Watches the config file and forwards validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LinkConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LinkConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let watched = path.clone();
        let file_name = path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                // Editors touch swap files next to the config.
                let touches_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !event.paths.is_empty() && !touches_config {
                    return;
                }
                match load_config(&path) {
                    Ok(new_config) => {
                        tracing::info!(path = ?path, "Config reloaded");
                        let _ = update_tx.send(new_config);
                    }
                    Err(e) => tracing::error!(
                        error = %e,
                        "Failed to reload config, keeping current configuration"
                    ),
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Apply reloaded connectivity policies to every controller until shutdown.
pub async fn apply_policy_updates(
    mut updates: mpsc::UnboundedReceiver<LinkConfig>,
    registry: ControllerRegistry,
    initial: ConnectivityConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut current = initial;
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                if !policy_changed(&current, &config.connectivity) {
                    tracing::debug!("Reloaded config leaves connectivity policy unchanged");
                    continue;
                }
                match ModePolicy::from_config(&config.connectivity) {
                    Ok(policy) => {
                        registry.update_policy(policy);
                        current = config.connectivity;
                    }
                    Err(e) => tracing::error!(error = %e, "Rejected reloaded connectivity policy"),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

fn policy_changed(old: &ConnectivityConfig, new: &ConnectivityConfig) -> bool {
    old.failure_threshold != new.failure_threshold
        || old.operational_window != new.operational_window
}
