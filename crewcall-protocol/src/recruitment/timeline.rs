use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::{Phase, RoleType};

/// Kind of organizational entity running a recruitment campaign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Activity,
    Initiative,
}

/// Per-timeline behavior toggles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TimelineSettings {
    #[serde(default)]
    pub auto_activate: bool,
    #[serde(default)]
    pub auto_expire: bool,
    #[serde(default)]
    pub notify_on_status_change: bool,
}

/// The full set of recruitment phases and settings for one entity.
/// At most one timeline exists per `entity_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub id: Uuid,
    pub entity_id: String,
    pub entity_type: EntityType,
    pub entity_name: String,
    /// Insertion order is preserved and meaningful for tie-breaking, but
    /// phases are not semantically ordered.
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub settings: TimelineSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timeline {
    /// Iterates phases recruiting for the given role, in insertion order.
    pub fn phases_for_role(&self, role: RoleType) -> impl Iterator<Item = &Phase> {
        self.phases.iter().filter(move |p| p.role_type == role)
    }

    pub fn find_phase(&self, phase_id: Uuid) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    pub fn find_phase_mut(&mut self, phase_id: Uuid) -> Option<&mut Phase> {
        self.phases.iter_mut().find(|p| p.id == phase_id)
    }

    /// Bumps the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Input for creating or replacing a timeline. Phases are managed
/// separately and never travel in the draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineDraft {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub entity_name: String,
    #[serde(default)]
    pub settings: TimelineSettings,
}

impl TimelineDraft {
    pub fn into_timeline(self) -> Timeline {
        let now = Utc::now();
        Timeline {
            id: Uuid::new_v4(),
            entity_id: self.entity_id,
            entity_type: self.entity_type,
            entity_name: self.entity_name,
            phases: Vec::new(),
            settings: self.settings,
            created_at: now,
            updated_at: now,
        }
    }
}
