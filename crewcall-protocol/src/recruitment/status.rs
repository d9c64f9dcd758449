use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Derived recruitment state for an (entity, role) pair. Richer than
/// `PhaseStatus` because it also accounts for capacity limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleStatus {
    Active,
    Inactive,
    Expired,
    Full,
}

/// Full answer to "can this role apply right now?", carrying the message
/// and the underlying phase so consumers need not re-derive state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleStatusReport {
    pub status: RoleStatus,
    pub can_apply: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

impl RoleStatusReport {
    pub fn inactive(message: impl Into<String>, phase: Option<Phase>) -> Self {
        Self {
            status: RoleStatus::Inactive,
            can_apply: false,
            message: message.into(),
            phase,
        }
    }

    pub fn expired(message: impl Into<String>, phase: Option<Phase>) -> Self {
        Self {
            status: RoleStatus::Expired,
            can_apply: false,
            message: message.into(),
            phase,
        }
    }

    pub fn full(message: impl Into<String>, phase: Phase) -> Self {
        Self {
            status: RoleStatus::Full,
            can_apply: false,
            message: message.into(),
            phase: Some(phase),
        }
    }

    pub fn active(message: impl Into<String>, phase: Phase) -> Self {
        Self {
            status: RoleStatus::Active,
            can_apply: true,
            message: message.into(),
            phase: Some(phase),
        }
    }
}
