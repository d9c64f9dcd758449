mod button;
mod events;
mod phase;
mod stats;
mod status;
mod timeline;

pub use button::{ButtonAction, ButtonState, RecruitmentButton};
pub use events::{ApplicationEvent, ApplicationKind, MonitorEvent, StatusChange};
pub use phase::{CountPolicy, Phase, PhaseDraft, PhasePatch, PhaseSettings, PhaseStatus, RoleType};
pub use stats::RegistryStats;
pub use status::{RoleStatus, RoleStatusReport};
pub use timeline::{EntityType, Timeline, TimelineDraft, TimelineSettings};
