//! Background status monitor. Re-evaluates every phase on a schedule,
//! raises transition events for external consumers (notifier, UI), and
//! batches persistence per sweep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crewcall_protocol::prelude::*;

use crate::service::TimelineService;

/// Margin added past a window boundary so the sweep lands strictly
/// after the transition instant (boundaries are inclusive).
const TRANSITION_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Fallback re-evaluation interval; the monitor also wakes at the
    /// exact next window boundary when one is nearer.
    pub poll_interval: Duration,
    pub channel_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            channel_capacity: 128,
        }
    }
}

impl MonitorConfig {
    pub fn from_core(config: &crewcall_core::CrewcallConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            ..Self::default()
        }
    }
}

/// Cheap handle for waking and observing a running monitor.
#[derive(Clone)]
pub struct MonitorHandle {
    events: broadcast::Sender<MonitorEvent>,
    wake: Arc<Notify>,
}

impl MonitorHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// Forces an immediate sweep, e.g. when the UI regained foreground
    /// visibility after a period without timer ticks.
    pub fn wake(&self) {
        self.wake.notify_one();
    }
}

/// Periodic re-evaluation loop over the whole registry.
pub struct StatusMonitor {
    service: TimelineService,
    config: MonitorConfig,
    events: broadcast::Sender<MonitorEvent>,
    wake: Arc<Notify>,
    stopping: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl StatusMonitor {
    pub fn new(service: TimelineService, config: MonitorConfig) -> Self {
        let (events, _) = broadcast::channel(config.channel_capacity);
        Self {
            service,
            config,
            events,
            wake: Arc::new(Notify::new()),
            stopping: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            events: self.events.clone(),
            wake: self.wake.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Spawns the monitor task. Starting a running monitor is a no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }
        self.stopping.store(false, Ordering::Relaxed);

        let service = self.service.clone();
        let config = self.config.clone();
        let events = self.events.clone();
        let wake = self.wake.clone();
        let stopping = self.stopping.clone();

        info!(poll_interval = ?config.poll_interval, "status monitor started");
        self.worker = Some(tokio::spawn(async move {
            monitor_loop(service, config, events, wake, stopping).await;
        }));
    }

    /// Cancels the periodic tick deterministically. Idempotent.
    pub async fn stop(&mut self) {
        self.stopping.store(true, Ordering::Relaxed);
        self.wake.notify_waiters();
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                error!(?err, "status monitor task panicked");
            }
            info!("status monitor stopped");
        }
    }
}

async fn monitor_loop(
    service: TimelineService,
    config: MonitorConfig,
    events: broadcast::Sender<MonitorEvent>,
    wake: Arc<Notify>,
    stopping: Arc<AtomicBool>,
) {
    loop {
        if stopping.load(Ordering::Relaxed) {
            break;
        }

        sweep(&service, &events);

        let sleep_for = next_sleep(&service, config.poll_interval);
        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = wake.notified() => {
                debug!("status monitor woken early");
            }
        }
    }
}

/// Sleep until the exact next window boundary when that is sooner than
/// the fallback interval. The fixed interval stays as a safety net
/// against missed or drifting timers.
fn next_sleep(service: &TimelineService, poll_interval: Duration) -> Duration {
    let now = service.now();
    match service.next_transition_after(now) {
        Some(boundary) => {
            let until = (boundary - now).to_std().unwrap_or(Duration::ZERO) + TRANSITION_GRACE;
            until.min(poll_interval)
        }
        None => poll_interval,
    }
}

fn sweep(service: &TimelineService, events: &broadcast::Sender<MonitorEvent>) {
    let changes = match service.refresh_statuses() {
        Ok(changes) => changes,
        Err(err) => {
            error!(?err, "status sweep failed");
            return;
        }
    };
    if changes.is_empty() {
        return;
    }

    debug!(transitions = changes.len(), "phase status transitions detected");
    for sweep_change in changes {
        if sweep_change.notify {
            // Send errors just mean nobody is subscribed right now.
            let _ = events.send(MonitorEvent::NotifyRequested(sweep_change.change.clone()));
        }
        let _ = events.send(MonitorEvent::StatusChanged(sweep_change.change));
    }
    let _ = events.send(MonitorEvent::RefreshButtons);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TimelineRepository;
    use crate::service::Clock;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn seeded_repository(notify: bool) -> TimelineRepository {
        let repository = TimelineRepository::in_memory();
        let service = TimelineService::new(repository.clone()).with_clock(Clock::fixed(t0()));
        service
            .create_timeline(TimelineDraft {
                entity_id: "proj-1".into(),
                entity_type: EntityType::Project,
                entity_name: "Project One".into(),
                settings: TimelineSettings {
                    notify_on_status_change: notify,
                    ..TimelineSettings::default()
                },
            })
            .unwrap();
        service
            .add_phase(
                "proj-1",
                PhaseDraft {
                    role_type: RoleType::Crew,
                    title: "Crew".into(),
                    description: String::new(),
                    starts_at: t0() + ChronoDuration::days(1),
                    ends_at: t0() + ChronoDuration::days(10),
                    form_id: None,
                    max_applications: None,
                    settings: PhaseSettings::default(),
                },
            )
            .unwrap();
        repository
    }

    async fn recv(
        rx: &mut broadcast::Receiver<MonitorEvent>,
    ) -> MonitorEvent {
        tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("monitor event within deadline")
            .expect("channel open")
    }

    #[tokio::test]
    async fn emits_transition_and_refresh_events() {
        let repository = seeded_repository(true);
        // The cached status says inactive; at t0+2d the phase is open.
        let service = TimelineService::new(repository)
            .with_clock(Clock::fixed(t0() + ChronoDuration::days(2)));

        let mut monitor = StatusMonitor::new(
            service,
            MonitorConfig {
                poll_interval: std::time::Duration::from_millis(10),
                channel_capacity: 16,
            },
        );
        let mut rx = monitor.subscribe();
        monitor.start();
        assert!(monitor.is_running());

        let first = recv(&mut rx).await;
        let MonitorEvent::NotifyRequested(change) = first else {
            panic!("expected notify request, got {first:?}");
        };
        assert_eq!(change.old_status, PhaseStatus::Inactive);
        assert_eq!(change.new_status, PhaseStatus::Active);

        assert!(matches!(recv(&mut rx).await, MonitorEvent::StatusChanged(_)));
        assert!(matches!(recv(&mut rx).await, MonitorEvent::RefreshButtons));

        monitor.stop().await;
        assert!(!monitor.is_running());
        // stop is idempotent
        monitor.stop().await;
    }

    #[tokio::test]
    async fn skips_notify_when_not_opted_in() {
        let repository = seeded_repository(false);
        let service = TimelineService::new(repository)
            .with_clock(Clock::fixed(t0() + ChronoDuration::days(2)));

        let mut monitor = StatusMonitor::new(
            service,
            MonitorConfig {
                poll_interval: std::time::Duration::from_millis(10),
                channel_capacity: 16,
            },
        );
        let mut rx = monitor.subscribe();
        monitor.start();

        assert!(matches!(recv(&mut rx).await, MonitorEvent::StatusChanged(_)));
        assert!(matches!(recv(&mut rx).await, MonitorEvent::RefreshButtons));
        monitor.stop().await;
    }

    #[tokio::test]
    async fn wake_forces_a_sweep_before_the_interval() {
        let repository = seeded_repository(false);
        let service = TimelineService::new(repository.clone())
            .with_clock(Clock::fixed(t0() + ChronoDuration::days(2)));

        // A long interval so only the wake call can trigger the sweep.
        let mut monitor = StatusMonitor::new(
            service,
            MonitorConfig {
                poll_interval: std::time::Duration::from_secs(3600),
                channel_capacity: 16,
            },
        );
        let handle = monitor.handle();
        monitor.start();

        // Let the initial sweep settle everything, then dirty a cache
        // entry behind the monitor's back.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let mut rx = handle.subscribe();
        repository.mutate(|registry| {
            let timeline = registry.get_mut("proj-1").unwrap();
            timeline.phases[0].status = PhaseStatus::Expired;
        });

        handle.wake();
        assert!(matches!(recv(&mut rx).await, MonitorEvent::StatusChanged(_)));
        monitor.stop().await;
    }
}
