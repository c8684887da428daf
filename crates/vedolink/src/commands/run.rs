//! `vedolink run`: discover, start polling, log changes until Ctrl-C.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vedolink_core::{AlarmEntity, Entity, Platform, ZoneEntity};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let platform = Platform::connect(vedolink_config::to_platform_config(&cfg))?;

    let entities = platform.discover().await?;
    if entities.is_empty() {
        return Err(CliError::InvalidConfig {
            path: config::config_path(global).display().to_string(),
        });
    }
    for entity in &entities {
        info!(entity = entity.name(), "registered");
    }

    let watchers = CancellationToken::new();
    let tasks: Vec<JoinHandle<()>> = entities
        .iter()
        .map(|entity| match entity {
            Entity::Alarm(alarm) => watch_alarm(Arc::clone(alarm), watchers.clone()),
            Entity::Zone(zone) => watch_zone(Arc::clone(zone), watchers.clone()),
        })
        .collect();

    let handle = platform.start()?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C, stopping");
    }
    info!("shutting down");

    platform.shutdown(handle).await;
    watchers.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "entity watcher ended abnormally");
        }
    }
    Ok(())
}

fn watch_alarm(alarm: Arc<AlarmEntity>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = alarm.subscribe();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                snap = stream.changed() => {
                    let Some(snap) = snap else { break };
                    let armed: Vec<&str> = snap
                        .areas
                        .iter()
                        .filter(|a| a.armed())
                        .map(|a| a.description.as_str())
                        .collect();
                    info!(
                        entity = alarm.name(),
                        mode = %snap.mode,
                        armed = %armed.join(", "),
                        "alarm state changed"
                    );
                }
            }
        }
    })
}

fn watch_zone(zone: Arc<ZoneEntity>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = zone.subscribe();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                snap = stream.changed() => {
                    let Some(snap) = snap else { break };
                    info!(
                        entity = zone.name(),
                        open = snap.zone.is_open(),
                        faulted = snap.zone.is_faulted(),
                        excluded = snap.zone.is_excluded(),
                        status = ?snap.zone.status,
                        "zone state changed"
                    );
                }
            }
        }
    })
}
