//! Façade over the registry and the status engine. All mutations persist
//! synchronously, so memory and store stay consistent within a process.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crewcall_protocol::prelude::*;

use crate::button;
use crate::engine;
use crate::error::{Result, TimelineError};
use crate::repository::TimelineRepository;

/// Injectable time source so tests can pin "now".
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl Clock {
    pub fn system() -> Self {
        Self(Arc::new(Utc::now))
    }

    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self(Arc::new(move || at))
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

/// One status transition detected by a sweep, with the owning timeline's
/// notification opt-in resolved.
#[derive(Debug, Clone)]
pub struct SweepChange {
    pub change: StatusChange,
    pub notify: bool,
}

/// Primary API used by UI consumers, the monitor and the event bridge.
#[derive(Clone)]
pub struct TimelineService {
    repository: TimelineRepository,
    clock: Clock,
    count_policy: CountPolicy,
}

impl TimelineService {
    pub fn new(repository: TimelineRepository) -> Self {
        Self {
            repository,
            clock: Clock::system(),
            count_policy: CountPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_count_policy(mut self, policy: CountPolicy) -> Self {
        self.count_policy = policy;
        self
    }

    pub fn repository(&self) -> &TimelineRepository {
        &self.repository
    }

    pub fn count_policy(&self) -> CountPolicy {
        self.count_policy
    }

    /// The service's notion of "now" (injectable for tests).
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Creates or replaces the timeline for an entity. Replacement swaps
    /// the top-level fields; phases (and their counters) are separately
    /// managed and carry over.
    pub fn create_timeline(&self, draft: TimelineDraft) -> Result<Timeline> {
        let timeline = match self.repository.get(&draft.entity_id) {
            Some(mut existing) => {
                existing.entity_type = draft.entity_type;
                existing.entity_name = draft.entity_name;
                existing.settings = draft.settings;
                existing.touch();
                existing
            }
            None => draft.into_timeline(),
        };

        info!(entity_id = %timeline.entity_id, "timeline upserted");
        self.repository.put(timeline.clone())?;
        Ok(timeline)
    }

    /// Drops an entity's timeline entirely. Idempotent.
    pub fn remove_timeline(&self, entity_id: &str) -> Result<bool> {
        self.repository.remove(entity_id)
    }

    pub fn get_timeline(&self, entity_id: &str) -> Option<Timeline> {
        self.repository.get(entity_id)
    }

    /// Appends a phase to an existing timeline; the initial status is
    /// computed immediately rather than waiting for the next sweep.
    pub fn add_phase(&self, entity_id: &str, draft: PhaseDraft) -> Result<Phase> {
        let now = self.clock.now();
        self.repository.update(entity_id, |timeline| {
            let mut phase = draft.into_phase(Uuid::new_v4());
            phase.status = engine::phase_status_at(now, phase.starts_at, phase.ends_at);
            timeline.phases.push(phase.clone());
            Ok(phase)
        })
    }

    /// Shallow-merges the patch into the phase. Moving either window
    /// endpoint recomputes the cached status on the spot.
    pub fn update_phase(&self, entity_id: &str, phase_id: Uuid, patch: PhasePatch) -> Result<Phase> {
        let now = self.clock.now();
        self.repository.update(entity_id, |timeline| {
            let phase = timeline
                .find_phase_mut(phase_id)
                .ok_or(TimelineError::PhaseNotFound(phase_id))?;
            patch.apply_to(phase);
            if patch.touches_dates() {
                phase.status = engine::phase_status_at(now, phase.starts_at, phase.ends_at);
            }
            Ok(phase.clone())
        })
    }

    /// Filters the phase out. Removing an absent phase is a success, not
    /// an error.
    pub fn remove_phase(&self, entity_id: &str, phase_id: Uuid) -> Result<()> {
        self.repository.update(entity_id, |timeline| {
            timeline.phases.retain(|phase| phase.id != phase_id);
            Ok(())
        })
    }

    /// Phases of an entity with statuses recomputed at read time.
    pub fn get_entity_phases(&self, entity_id: &str) -> Result<Vec<Phase>> {
        let now = self.clock.now();
        let timeline = self
            .repository
            .get(entity_id)
            .ok_or_else(|| TimelineError::TimelineNotFound(entity_id.to_string()))?;
        Ok(timeline
            .phases
            .into_iter()
            .map(|mut phase| {
                phase.status = engine::phase_status_at(now, phase.starts_at, phase.ends_at);
                phase
            })
            .collect())
    }

    /// Counts an application against the phase currently open for the
    /// role. Deliberately not idempotent: there is no dedup key, every
    /// call counts. No-op when no timeline or no open phase exists.
    pub fn record_application(
        &self,
        entity_id: &str,
        role: RoleType,
        kind: ApplicationKind,
    ) -> Result<Option<Phase>> {
        if !self.repository.contains(entity_id) {
            debug!(entity_id, "application event for unknown entity dropped");
            return Ok(None);
        }

        let now = self.clock.now();
        self.repository.update(entity_id, |timeline| {
            let phase_id = engine::current_phase(timeline, role, now).map(|phase| phase.id);
            let Some(phase_id) = phase_id else {
                debug!(entity_id, %role, "no open phase, application not counted");
                return Ok(None);
            };

            // The id came from the scan above; the phase is present.
            let phase = timeline
                .find_phase_mut(phase_id)
                .ok_or(TimelineError::PhaseNotFound(phase_id))?;
            match kind {
                ApplicationKind::Submitted => phase.submitted_count += 1,
                ApplicationKind::Approved => phase.approved_count += 1,
            }
            Ok(Some(phase.clone()))
        })
    }

    /// Derived recruitment status for an (entity, role) pair.
    pub fn role_status(&self, entity_id: &str, role: RoleType) -> RoleStatusReport {
        let now = self.clock.now();
        let timeline = self.repository.get(entity_id);
        engine::role_status(timeline.as_ref(), role, now, self.count_policy)
    }

    /// UI action descriptor for the role's recruitment button.
    pub fn recruitment_button(&self, entity_id: &str, role: RoleType) -> RecruitmentButton {
        let report = self.role_status(entity_id, role);
        button::build_button(entity_id, role, &report)
    }

    /// Serializes one timeline, or the whole registry, as
    /// `{ entity_id: Timeline }`.
    pub fn export(&self, entity_id: Option<&str>) -> Result<Value> {
        let map: BTreeMap<String, Timeline> = match entity_id {
            Some(id) => {
                let timeline = self
                    .repository
                    .get(id)
                    .ok_or_else(|| TimelineError::TimelineNotFound(id.to_string()))?;
                BTreeMap::from([(id.to_string(), timeline)])
            }
            None => self.repository.snapshot().into_iter().collect(),
        };
        Ok(serde_json::to_value(map)?)
    }

    /// Replaces the registry wholesale with the imported data and
    /// persists. Cached statuses are recomputed on the next read rather
    /// than trusted.
    pub fn import(&self, data: Value) -> Result<usize> {
        let map: HashMap<String, Timeline> = serde_json::from_value(data)
            .map_err(|err| TimelineError::InvalidImport(err.to_string()))?;
        for (key, timeline) in &map {
            if key != &timeline.entity_id {
                return Err(TimelineError::InvalidImport(format!(
                    "key {} does not match entity id {}",
                    key, timeline.entity_id
                )));
            }
        }
        let count = map.len();
        self.repository.replace_all(map)?;
        info!(timelines = count, "registry imported");
        Ok(count)
    }

    /// Read-only reducer over the registry. Phase statuses are derived
    /// at "now", not taken from the cache.
    pub fn statistics(&self) -> RegistryStats {
        let now = self.clock.now();
        self.repository.with_registry(|registry| {
            let mut stats = RegistryStats::default();
            for timeline in registry.values() {
                stats.total_timelines += 1;
                match timeline.entity_type {
                    EntityType::Project => stats.project_timelines += 1,
                    EntityType::Activity => stats.activity_timelines += 1,
                    EntityType::Initiative => stats.initiative_timelines += 1,
                }
                for phase in &timeline.phases {
                    stats.total_phases += 1;
                    stats.total_submitted += u64::from(phase.submitted_count);
                    stats.total_approved += u64::from(phase.approved_count);
                    match engine::phase_status_at(now, phase.starts_at, phase.ends_at) {
                        PhaseStatus::Active => stats.active_phases += 1,
                        PhaseStatus::Inactive => stats.inactive_phases += 1,
                        PhaseStatus::Expired => stats.expired_phases += 1,
                    }
                    match phase.role_type {
                        RoleType::Crew => stats.crew_phases += 1,
                        RoleType::Volunteer => stats.volunteer_phases += 1,
                        RoleType::Participant => stats.participant_phases += 1,
                    }
                }
            }
            stats
        })
    }

    /// Recomputes every cached phase status, returning the transitions.
    /// Persists once, and only when something changed.
    pub fn refresh_statuses(&self) -> Result<Vec<SweepChange>> {
        let now = self.clock.now();
        let changes = self.repository.mutate(|registry| {
            let mut changes = Vec::new();
            for timeline in registry.values_mut() {
                let notify = timeline.settings.notify_on_status_change;
                for phase in &mut timeline.phases {
                    let new_status = engine::phase_status_at(now, phase.starts_at, phase.ends_at);
                    if new_status != phase.status {
                        let old_status = phase.status;
                        phase.status = new_status;
                        changes.push(SweepChange {
                            change: StatusChange {
                                entity_id: timeline.entity_id.clone(),
                                phase: phase.clone(),
                                old_status,
                                new_status,
                            },
                            notify,
                        });
                    }
                }
            }
            changes
        });

        if !changes.is_empty() {
            self.repository.persist()?;
        }
        Ok(changes)
    }

    /// Earliest future window boundary across all phases, used by the
    /// monitor to sleep until the next exact transition instant.
    pub fn next_transition_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.repository.with_registry(|registry| {
            registry
                .values()
                .flat_map(|timeline| &timeline.phases)
                .flat_map(|phase| [phase.starts_at, phase.ends_at])
                .filter(|instant| *instant > now)
                .min()
        })
    }
}
