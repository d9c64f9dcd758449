use std::env;
use std::path::PathBuf;

use crate::errors::{ConfigError, CoreError};

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Global configuration shared across the recruitment services.
#[derive(Debug, Clone)]
pub struct CrewcallConfig {
    /// Directory holding the persisted registry. Falls back to the home
    /// directory when unset.
    pub data_dir: Option<PathBuf>,
    /// Fallback polling interval for the status monitor, in seconds.
    pub poll_interval_secs: u64,
    pub environment: Environment,
    pub node_name: String,
}

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

impl Default for CrewcallConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            environment: Environment::default(),
            node_name: "crewcall-node".to_string(),
        }
    }
}

impl CrewcallConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("CREWCALL_")
    }

    /// Loads configuration from env vars prefixed with the provided value.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let data_dir = env::var(key("DATA_DIR")).ok().map(PathBuf::from);

        let poll_key = key("POLL_INTERVAL_SECS");
        let poll_interval_secs = match env::var(&poll_key) {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnvVar {
                key: poll_key,
                value: raw,
            })?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let environment = env::var(key("ENV"))
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        let node_name =
            env::var(key("NODE_NAME")).unwrap_or_else(|_| "crewcall-node".to_string());

        Ok(Self {
            data_dir,
            poll_interval_secs,
            environment,
            node_name,
        })
    }

    /// Whether the service is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

/// Helper that loads config and converts to the canonical error type.
pub fn load_config() -> Result<CrewcallConfig, CoreError> {
    Ok(CrewcallConfig::from_env()?)
}
