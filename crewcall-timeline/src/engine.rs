//! Pure status derivation. Nothing in this module has side effects; the
//! service and the monitor feed it the current instant and interpret the
//! results.

use chrono::{DateTime, Utc};
use crewcall_protocol::prelude::*;

/// Derives a phase's window status at the given instant. Both window
/// endpoints count as active (inclusive boundaries).
pub fn phase_status_at(
    now: DateTime<Utc>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> PhaseStatus {
    if now < starts_at {
        PhaseStatus::Inactive
    } else if now > ends_at {
        PhaseStatus::Expired
    } else {
        PhaseStatus::Active
    }
}

/// The phase currently recruiting for the role, if any.
///
/// When several windows for the same role contain `now` (overlap is
/// permitted by the model), the first phase in insertion order wins.
pub fn current_phase(timeline: &Timeline, role: RoleType, now: DateTime<Utc>) -> Option<&Phase> {
    timeline
        .phases_for_role(role)
        .find(|phase| phase.window_contains(now))
}

/// The upcoming phase for the role with the earliest start strictly
/// after `now`.
pub fn next_phase(timeline: &Timeline, role: RoleType, now: DateTime<Utc>) -> Option<&Phase> {
    timeline
        .phases_for_role(role)
        .filter(|phase| phase.starts_at > now)
        .min_by_key(|phase| phase.starts_at)
}

/// Full (entity, role) status derivation, including capacity and the
/// next-phase hint when nothing is currently open.
pub fn role_status(
    timeline: Option<&Timeline>,
    role: RoleType,
    now: DateTime<Utc>,
    policy: CountPolicy,
) -> RoleStatusReport {
    let Some(timeline) = timeline else {
        return RoleStatusReport::inactive("No recruitment configured", None);
    };

    let Some(phase) = current_phase(timeline, role, now) else {
        return match next_phase(timeline, role, now) {
            Some(next) => RoleStatusReport::inactive(
                format!("Next recruitment opens on {}", format_date(next.starts_at)),
                Some(next.clone()),
            ),
            None => RoleStatusReport::inactive("No recruitment scheduled", None),
        };
    };

    phase_report(phase, now, policy)
}

/// Status derivation for one concrete phase. Also used by callers that
/// already hold a phase reference (button rendering, admin screens).
pub fn phase_report(phase: &Phase, now: DateTime<Utc>, policy: CountPolicy) -> RoleStatusReport {
    match phase_status_at(now, phase.starts_at, phase.ends_at) {
        PhaseStatus::Inactive => RoleStatusReport::inactive(
            format!("Recruitment opens on {}", format_date(phase.starts_at)),
            Some(phase.clone()),
        ),
        PhaseStatus::Expired => RoleStatusReport::expired(
            format!("Recruitment closed on {}", format_date(phase.ends_at)),
            Some(phase.clone()),
        ),
        PhaseStatus::Active => {
            if phase.capacity_reached(policy) {
                RoleStatusReport::full("All spots are filled", phase.clone())
            } else {
                RoleStatusReport::active("Recruitment is open", phase.clone())
            }
        }
    }
}

fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}
