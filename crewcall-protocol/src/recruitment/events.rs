use serde::{Deserialize, Serialize};

use super::phase::{Phase, PhaseStatus, RoleType};

/// Which counter an application event feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    Submitted,
    Approved,
}

/// Application-lifecycle events consumed from the surrounding
/// application (form handling, review screens).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationEvent {
    /// A recruitment form was submitted.
    Submitted { entity_id: String, role_type: RoleType },
    /// An application's review outcome changed to approved.
    Approved { entity_id: String, role_type: RoleType },
}

impl ApplicationEvent {
    pub fn entity_id(&self) -> &str {
        match self {
            ApplicationEvent::Submitted { entity_id, .. }
            | ApplicationEvent::Approved { entity_id, .. } => entity_id,
        }
    }

    pub fn role_type(&self) -> RoleType {
        match self {
            ApplicationEvent::Submitted { role_type, .. }
            | ApplicationEvent::Approved { role_type, .. } => *role_type,
        }
    }

    pub fn kind(&self) -> ApplicationKind {
        match self {
            ApplicationEvent::Submitted { .. } => ApplicationKind::Submitted,
            ApplicationEvent::Approved { .. } => ApplicationKind::Approved,
        }
    }
}

/// A detected phase status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusChange {
    pub entity_id: String,
    pub phase: Phase,
    pub old_status: PhaseStatus,
    pub new_status: PhaseStatus,
}

/// Events produced by the status monitor for external consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A phase crossed a window boundary.
    StatusChanged(StatusChange),
    /// The owning timeline opted into notifications; an external
    /// notifier should act on this.
    NotifyRequested(StatusChange),
    /// At least one phase changed this sweep; bound UI controls should
    /// re-render their buttons.
    RefreshButtons,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_events_are_tagged() {
        let event = ApplicationEvent::Submitted {
            entity_id: "proj-1".into(),
            role_type: RoleType::Crew,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "submitted");
        assert_eq!(event.kind(), ApplicationKind::Submitted);
        assert_eq!(event.entity_id(), "proj-1");
    }
}
