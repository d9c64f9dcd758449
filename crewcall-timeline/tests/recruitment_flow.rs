//! End-to-end recruitment flow: registry persistence, phase lifecycle,
//! status derivation, button rendering and monitor transitions through
//! the public API.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::broadcast;

use crewcall_protocol::prelude::*;
use crewcall_timeline::{
    Clock, EventBridge, JsonFileStore, MonitorConfig, StatusMonitor, TimelineRepository,
    TimelineService,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

fn project_draft() -> TimelineDraft {
    TimelineDraft {
        entity_id: "proj-1".into(),
        entity_type: EntityType::Project,
        entity_name: "Harbor Cleanup".into(),
        settings: TimelineSettings {
            notify_on_status_change: true,
            ..TimelineSettings::default()
        },
    }
}

fn volunteer_phase(start: DateTime<Utc>, end: DateTime<Utc>) -> PhaseDraft {
    PhaseDraft {
        role_type: RoleType::Volunteer,
        title: "Cleanup volunteers".into(),
        description: "Weekend shifts at the harbor".into(),
        starts_at: start,
        ends_at: end,
        form_id: Some("form-42".into()),
        max_applications: Some(5),
        settings: PhaseSettings::default(),
    }
}

#[test]
fn full_lifecycle_survives_a_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("registry.json")));

    {
        let repository = TimelineRepository::open(store.clone());
        let service = TimelineService::new(repository).with_clock(Clock::fixed(t0()));
        service.create_timeline(project_draft()).unwrap();
        service
            .add_phase("proj-1", volunteer_phase(t0(), t0() + Duration::days(10)))
            .unwrap();
        service
            .record_application("proj-1", RoleType::Volunteer, ApplicationKind::Submitted)
            .unwrap();
    }

    // A new process sees the persisted registry, counters included.
    let repository = TimelineRepository::open(store);
    let service = TimelineService::new(repository)
        .with_clock(Clock::fixed(t0() + Duration::days(5)));
    let report = service.role_status("proj-1", RoleType::Volunteer);
    assert_eq!(report.status, RoleStatus::Active);
    assert!(report.can_apply);
    assert_eq!(report.phase.unwrap().submitted_count, 1);
}

#[test]
fn button_follows_the_role_status() {
    let service = TimelineService::new(TimelineRepository::in_memory())
        .with_clock(Clock::fixed(t0() + Duration::days(5)));

    // No timeline yet: disabled fallback.
    let button = service.recruitment_button("proj-1", RoleType::Volunteer);
    assert!(!button.enabled);
    assert_eq!(button.css_state, ButtonState::Disabled);

    service.create_timeline(project_draft()).unwrap();
    service
        .add_phase("proj-1", volunteer_phase(t0(), t0() + Duration::days(10)))
        .unwrap();

    let button = service.recruitment_button("proj-1", RoleType::Volunteer);
    assert!(button.enabled);
    assert_eq!(button.css_state, ButtonState::Active);
    assert_eq!(button.text, "Be a Volunteer");
    assert_eq!(
        button.action,
        Some(ButtonAction::OpenForm {
            form_id: "form-42".into()
        })
    );

    // Fill the phase; the button flips to full and loses its action.
    for _ in 0..5 {
        service
            .record_application("proj-1", RoleType::Volunteer, ApplicationKind::Submitted)
            .unwrap();
    }
    let button = service.recruitment_button("proj-1", RoleType::Volunteer);
    assert!(!button.enabled);
    assert_eq!(button.css_state, ButtonState::Full);
    assert!(button.action.is_none());
}

#[test]
fn export_round_trips_into_a_fresh_registry() {
    let service = TimelineService::new(TimelineRepository::in_memory())
        .with_clock(Clock::fixed(t0()));
    service.create_timeline(project_draft()).unwrap();
    service
        .add_phase("proj-1", volunteer_phase(t0(), t0() + Duration::days(10)))
        .unwrap();
    let exported = service.export(Some("proj-1")).unwrap();

    let fresh = TimelineService::new(TimelineRepository::in_memory())
        .with_clock(Clock::fixed(t0()));
    assert_eq!(fresh.import(exported).unwrap(), 1);
    assert_eq!(
        fresh.get_timeline("proj-1").unwrap(),
        service.get_timeline("proj-1").unwrap()
    );
}

#[tokio::test]
async fn bridge_and_monitor_cooperate_over_one_registry() {
    let repository = TimelineRepository::in_memory();
    let setup = TimelineService::new(repository.clone()).with_clock(Clock::fixed(t0()));
    setup.create_timeline(project_draft()).unwrap();
    setup
        .add_phase(
            "proj-1",
            volunteer_phase(t0() + Duration::days(1), t0() + Duration::days(10)),
        )
        .unwrap();

    // Later, the phase has opened but the cached status still says
    // inactive; the monitor catches the transition.
    let service = TimelineService::new(repository.clone())
        .with_clock(Clock::fixed(t0() + Duration::days(2)));
    let mut monitor = StatusMonitor::new(
        service.clone(),
        MonitorConfig {
            poll_interval: std::time::Duration::from_millis(10),
            channel_capacity: 16,
        },
    );
    let mut events = monitor.subscribe();
    monitor.start();

    let mut saw_notify = false;
    let mut saw_refresh = false;
    while !(saw_notify && saw_refresh) {
        let event = tokio::time::timeout(std::time::Duration::from_secs(2), events.recv())
            .await
            .expect("monitor event within deadline")
            .expect("channel open");
        match event {
            MonitorEvent::NotifyRequested(change) => {
                assert_eq!(change.new_status, PhaseStatus::Active);
                saw_notify = true;
            }
            MonitorEvent::RefreshButtons => saw_refresh = true,
            MonitorEvent::StatusChanged(_) => {}
        }
    }
    monitor.stop().await;

    // Application events flow through the bridge into the counters.
    let (tx, rx) = broadcast::channel(8);
    let bridge = EventBridge::spawn(service.clone(), rx);
    tx.send(ApplicationEvent::Submitted {
        entity_id: "proj-1".into(),
        role_type: RoleType::Volunteer,
    })
    .unwrap();
    tx.send(ApplicationEvent::Approved {
        entity_id: "proj-1".into(),
        role_type: RoleType::Volunteer,
    })
    .unwrap();
    drop(tx);
    bridge.join().await;

    let report = service.role_status("proj-1", RoleType::Volunteer);
    let phase = report.phase.expect("open phase");
    assert_eq!(phase.submitted_count, 1);
    assert_eq!(phase.approved_count, 1);
}
