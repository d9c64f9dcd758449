//! Core shared library for the Crewcall recruitment system.
//!
//! This crate exposes the primitives the service crates depend on:
//! the canonical error type, configuration loading and logging setup.

pub mod config;
pub mod errors;
pub mod logging;

pub use config::{CrewcallConfig, Environment};
pub use errors::{CoreError, Result as CoreResult};
