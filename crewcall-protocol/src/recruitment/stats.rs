use serde::{Deserialize, Serialize};

/// Aggregated view over the whole registry; produced by the service's
/// statistics reducer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_timelines: u64,
    pub total_phases: u64,
    pub total_submitted: u64,
    pub total_approved: u64,
    pub active_phases: u64,
    pub inactive_phases: u64,
    pub expired_phases: u64,
    pub crew_phases: u64,
    pub volunteer_phases: u64,
    pub participant_phases: u64,
    pub project_timelines: u64,
    pub activity_timelines: u64,
    pub initiative_timelines: u64,
}
