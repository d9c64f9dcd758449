use thiserror::Error;
use uuid::Uuid;

/// Result type used across the timeline crate.
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors surfaced by the recruitment timeline service and repository.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("no recruitment timeline registered for entity {0}")]
    TimelineNotFound(String),

    #[error("phase {0} not found")]
    PhaseNotFound(Uuid),

    #[error("failed to access the registry store")]
    Storage {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize the registry: {0}")]
    Serialization(String),

    #[error("invalid import payload: {0}")]
    InvalidImport(String),
}

impl TimelineError {
    pub fn from_io(source: std::io::Error) -> Self {
        TimelineError::Storage { source }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        TimelineError::Serialization(err.to_string())
    }
}

impl From<TimelineError> for crewcall_core::CoreError {
    fn from(err: TimelineError) -> Self {
        crewcall_core::CoreError::TimelineError(err.to_string())
    }
}
