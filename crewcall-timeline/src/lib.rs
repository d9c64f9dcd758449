//! Recruitment timeline core for the Crewcall system.
//!
//! Derives the recruitment status of each (entity, role) pair from
//! wall-clock time and campaign configuration, keeps UI button
//! descriptors in sync, and raises events when phases cross their window
//! boundaries. Persistence is a single-document registry store; the
//! surrounding application consumes statuses and button descriptors and
//! feeds application-lifecycle events back in.

pub mod bridge;
pub mod button;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod repository;
pub mod service;

pub use bridge::EventBridge;
pub use error::{Result, TimelineError};
pub use monitor::{MonitorConfig, MonitorHandle, StatusMonitor};
pub use repository::{JsonFileStore, MemoryStore, RegistryStore, TimelineRepository};
pub use service::{Clock, SweepChange, TimelineService};
