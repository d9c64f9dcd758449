//! Bridges externally raised application-lifecycle events into counter
//! updates. Both submission and approval feed the service; the counters
//! stay separate so consumers choose what "current applications" means.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crewcall_protocol::prelude::*;

use crate::service::TimelineService;

/// Handle over the running bridge task.
pub struct EventBridge {
    worker: JoinHandle<()>,
}

impl EventBridge {
    /// Subscribes the service to an application event stream. The task
    /// runs until the sending side closes or `shutdown` is called.
    pub fn spawn(
        service: TimelineService,
        events: broadcast::Receiver<ApplicationEvent>,
    ) -> Self {
        let worker = tokio::spawn(async move {
            bridge_loop(service, events).await;
        });
        Self { worker }
    }

    pub async fn shutdown(self) {
        self.worker.abort();
        let _ = self.worker.await;
    }

    /// Waits for the bridge to drain and exit. Only returns once the
    /// sending side has been closed.
    pub async fn join(self) {
        let _ = self.worker.await;
    }
}

async fn bridge_loop(
    service: TimelineService,
    mut events: broadcast::Receiver<ApplicationEvent>,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "application event stream lagged, counts may drift");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let entity_id = event.entity_id().to_string();
        let role = event.role_type();
        let kind = event.kind();
        match service.record_application(&entity_id, role, kind) {
            Ok(Some(phase)) => {
                debug!(
                    entity_id,
                    %role,
                    ?kind,
                    submitted = phase.submitted_count,
                    approved = phase.approved_count,
                    "application counted"
                );
            }
            Ok(None) => {
                debug!(entity_id, %role, "application event outside any open phase");
            }
            Err(err) => {
                error!(?err, entity_id, "failed to record application");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TimelineRepository;
    use crate::service::Clock;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn forwards_submissions_and_approvals() {
        let t0 = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let service = TimelineService::new(TimelineRepository::in_memory())
            .with_clock(Clock::fixed(t0));
        service
            .create_timeline(TimelineDraft {
                entity_id: "proj-1".into(),
                entity_type: EntityType::Project,
                entity_name: "Project One".into(),
                settings: TimelineSettings::default(),
            })
            .unwrap();
        let phase = service
            .add_phase(
                "proj-1",
                PhaseDraft {
                    role_type: RoleType::Participant,
                    title: "Participants".into(),
                    description: String::new(),
                    starts_at: t0 - Duration::days(1),
                    ends_at: t0 + Duration::days(1),
                    form_id: None,
                    max_applications: None,
                    settings: PhaseSettings::default(),
                },
            )
            .unwrap();

        let (tx, rx) = broadcast::channel(16);
        let bridge = EventBridge::spawn(service.clone(), rx);

        tx.send(ApplicationEvent::Submitted {
            entity_id: "proj-1".into(),
            role_type: RoleType::Participant,
        })
        .unwrap();
        tx.send(ApplicationEvent::Approved {
            entity_id: "proj-1".into(),
            role_type: RoleType::Participant,
        })
        .unwrap();
        drop(tx);

        // Closing the sender ends the loop after it drains the queue.
        bridge.join().await;

        let stored = service
            .get_timeline("proj-1")
            .unwrap()
            .find_phase(phase.id)
            .cloned()
            .unwrap();
        assert_eq!(stored.submitted_count, 1);
        assert_eq!(stored.approved_count, 1);
    }

    #[tokio::test]
    async fn unknown_entities_are_ignored() {
        let service = TimelineService::new(TimelineRepository::in_memory());
        let (tx, rx) = broadcast::channel(4);
        let bridge = EventBridge::spawn(service, rx);

        tx.send(ApplicationEvent::Submitted {
            entity_id: "ghost".into(),
            role_type: RoleType::Crew,
        })
        .unwrap();
        drop(tx);

        bridge.join().await;
    }
}
