use serde::{Deserialize, Serialize};

use super::phase::RoleType;

/// CSS-facing state string carried by the button descriptor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Active,
    Inactive,
    Expired,
    Full,
    Disabled,
}

impl ButtonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonState::Active => "active",
            ButtonState::Inactive => "inactive",
            ButtonState::Expired => "expired",
            ButtonState::Full => "full",
            ButtonState::Disabled => "disabled",
        }
    }
}

/// Action bound to an enabled recruitment button.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ButtonAction {
    OpenForm { form_id: String },
}

/// UI-facing descriptor for a recruitment call-to-action. Only `active`
/// buttons are enabled and carry an action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecruitmentButton {
    pub text: String,
    pub role_type: RoleType,
    pub entity_id: String,
    pub enabled: bool,
    pub css_state: ButtonState,
    pub tooltip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ButtonAction>,
}
