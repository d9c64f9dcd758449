//! Maps role status reports to UI-facing button descriptors. Pure
//! presentation logic; nothing here touches the registry.

use crewcall_protocol::prelude::*;

/// Default call-to-action text per recruited role.
pub fn default_text(role: Option<RoleType>) -> &'static str {
    match role {
        Some(RoleType::Crew) => "Join Project",
        Some(RoleType::Volunteer) => "Be a Volunteer",
        Some(RoleType::Participant) => "Join Us",
        None => "Apply",
    }
}

/// Builds the button descriptor for an (entity, role) pair from its
/// status report. Only an `active` report yields an enabled button with
/// a bound open-form action.
pub fn build_button(
    entity_id: &str,
    role: RoleType,
    report: &RoleStatusReport,
) -> RecruitmentButton {
    let css_state = match (report.phase.as_ref(), report.status) {
        (_, RoleStatus::Active) => ButtonState::Active,
        (Some(_), RoleStatus::Inactive) => ButtonState::Inactive,
        (_, RoleStatus::Expired) => ButtonState::Expired,
        (_, RoleStatus::Full) => ButtonState::Full,
        // No timeline or nothing scheduled: the catch-all disabled look.
        (None, _) => ButtonState::Disabled,
    };

    let form_id = report.phase.as_ref().and_then(|phase| phase.form_id.clone());
    let action = match (report.status, &form_id) {
        (RoleStatus::Active, Some(form_id)) => Some(ButtonAction::OpenForm {
            form_id: form_id.clone(),
        }),
        _ => None,
    };

    RecruitmentButton {
        text: default_text(Some(role)).to_string(),
        role_type: role,
        entity_id: entity_id.to_string(),
        enabled: report.status == RoleStatus::Active,
        css_state,
        tooltip: report.message.clone(),
        form_id,
        action,
    }
}
