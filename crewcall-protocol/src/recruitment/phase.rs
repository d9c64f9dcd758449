use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of participant a recruitment phase is looking for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    Crew,
    Volunteer,
    Participant,
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RoleType::Crew => "crew",
            RoleType::Volunteer => "volunteer",
            RoleType::Participant => "participant",
        };
        f.write_str(label)
    }
}

/// Cached time-window status of a single phase. Derived, never
/// authoritative: it is recomputed on every read and by the monitor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Inactive,
    Active,
    Expired,
}

/// Which counter feeds capacity checks and display.
///
/// The original system funnelled both submissions and approvals into one
/// field; `Combined` reproduces that behavior, while `Submitted` and
/// `Approved` let consumers pick a single counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    Submitted,
    Approved,
    #[default]
    Combined,
}

/// Per-phase behavior toggles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PhaseSettings {
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default)]
    pub allow_multiple_applications: bool,
    #[serde(default)]
    pub send_confirmation_email: bool,
}

/// A single time-windowed recruitment effort for one role type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    pub id: Uuid,
    pub role_type: RoleType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Window endpoints are inclusive; `ends_at >= starts_at` is the
    /// caller's responsibility and is not enforced here.
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_applications: Option<u32>,
    #[serde(default)]
    pub submitted_count: u32,
    #[serde(default)]
    pub approved_count: u32,
    #[serde(default)]
    pub settings: PhaseSettings,
}

impl Phase {
    /// Whether the phase window contains the given instant (inclusive on
    /// both ends).
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at && now <= self.ends_at
    }

    /// The application count under the given policy.
    pub fn current_applications(&self, policy: CountPolicy) -> u32 {
        match policy {
            CountPolicy::Submitted => self.submitted_count,
            CountPolicy::Approved => self.approved_count,
            CountPolicy::Combined => self.submitted_count.saturating_add(self.approved_count),
        }
    }

    /// Whether the capacity limit has been reached. Uncapped phases are
    /// never full.
    pub fn capacity_reached(&self, policy: CountPolicy) -> bool {
        match self.max_applications {
            Some(max) => self.current_applications(policy) >= max,
            None => false,
        }
    }

    /// Clears both counters. The only sanctioned way counts decrease.
    pub fn reset_counters(&mut self) {
        self.submitted_count = 0;
        self.approved_count = 0;
    }
}

/// Input for creating a phase. The service assigns the id and the
/// initial status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseDraft {
    pub role_type: RoleType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub max_applications: Option<u32>,
    #[serde(default)]
    pub settings: PhaseSettings,
}

impl PhaseDraft {
    pub fn into_phase(self, id: Uuid) -> Phase {
        Phase {
            id,
            role_type: self.role_type,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            status: PhaseStatus::default(),
            form_id: self.form_id,
            max_applications: self.max_applications,
            submitted_count: 0,
            approved_count: 0,
            settings: self.settings,
        }
    }
}

/// Shallow-merge patch for `update_phase`; `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhasePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub max_applications: Option<u32>,
    #[serde(default)]
    pub settings: Option<PhaseSettings>,
}

impl PhasePatch {
    /// Whether applying the patch moves either window endpoint.
    pub fn touches_dates(&self) -> bool {
        self.starts_at.is_some() || self.ends_at.is_some()
    }

    pub fn apply_to(&self, phase: &mut Phase) {
        if let Some(title) = &self.title {
            phase.title = title.clone();
        }
        if let Some(description) = &self.description {
            phase.description = description.clone();
        }
        if let Some(starts_at) = self.starts_at {
            phase.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            phase.ends_at = ends_at;
        }
        if let Some(form_id) = &self.form_id {
            phase.form_id = Some(form_id.clone());
        }
        if let Some(max) = self.max_applications {
            phase.max_applications = Some(max);
        }
        if let Some(settings) = self.settings {
            phase.settings = settings;
        }
    }
}
