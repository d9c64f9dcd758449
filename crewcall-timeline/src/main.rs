//! Standalone status monitor daemon: watches the shared registry and
//! logs recruitment transitions until interrupted.

use std::sync::Arc;

use tracing::{info, warn};

use crewcall_core::config::CrewcallConfig;
use crewcall_core::{logging, CoreError};
use crewcall_protocol::prelude::*;
use crewcall_timeline::{JsonFileStore, MonitorConfig, StatusMonitor, TimelineRepository, TimelineService};

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    if let Err(err) = logging::init_tracing(None) {
        eprintln!("failed to initialise tracing: {err}");
    }

    let config = CrewcallConfig::from_env()?;
    let store = Arc::new(JsonFileStore::default_path(config.data_dir.as_deref())?);
    let repository = TimelineRepository::open(store);
    let service = TimelineService::new(repository);

    let mut monitor = StatusMonitor::new(service, MonitorConfig::from_core(&config));
    let mut events = monitor.subscribe();
    monitor.start();
    info!(node = %config.node_name, "crewcall status monitor running");

    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                MonitorEvent::StatusChanged(change) => {
                    info!(
                        entity_id = %change.entity_id,
                        phase = %change.phase.title,
                        old = ?change.old_status,
                        new = ?change.new_status,
                        "phase status changed"
                    );
                }
                MonitorEvent::NotifyRequested(change) => {
                    // Delivery belongs to the external notifier; this
                    // daemon only surfaces the request.
                    warn!(
                        entity_id = %change.entity_id,
                        phase = %change.phase.title,
                        "notification requested but no notifier attached"
                    );
                }
                MonitorEvent::RefreshButtons => {
                    info!("recruitment buttons need a refresh");
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    monitor.stop().await;
    Ok(())
}
