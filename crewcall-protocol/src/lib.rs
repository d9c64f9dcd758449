pub mod recruitment;

pub mod prelude {
    pub use crate::recruitment::{
        ApplicationEvent, ApplicationKind, ButtonAction, ButtonState, CountPolicy, EntityType,
        MonitorEvent, Phase, PhaseDraft, PhasePatch, PhaseSettings, PhaseStatus, RecruitmentButton,
        RegistryStats, RoleStatus, RoleStatusReport, RoleType, StatusChange, Timeline,
        TimelineDraft, TimelineSettings,
    };
}
