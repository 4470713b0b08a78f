//! Server configuration
//!
//! Read from `BROKER_API_*` environment variables at startup.

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::Level;

use servicebroker_core::{Catalog, ProvisioningMode};

use crate::api::auth::BrokerCredentials;

pub const PORT: &str = "BROKER_API_PORT";
pub const LOG_LEVEL: &str = "BROKER_API_LOG_LEVEL";
pub const USERNAME: &str = "BROKER_API_USERNAME";
pub const PASSWORD: &str = "BROKER_API_PASSWORD";
pub const CATALOG_PATH: &str = "BROKER_API_CATALOG_PATH";
pub const PROVISIONING_MODE: &str = "BROKER_API_PROVISIONING_MODE";
pub const INSTANCE_LIMIT: &str = "BROKER_API_INSTANCE_LIMIT";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to load catalog from {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },
}

/// Runtime configuration of the server binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: Level,
    pub credentials: BrokerCredentials,
    /// JSON catalog served by the in-memory broker
    pub catalog_path: Option<PathBuf>,
    pub provisioning_mode: ProvisioningMode,
    pub instance_limit: Option<usize>,
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup(PORT) {
            Some(value) => value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: PORT,
                value: value.clone(),
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        // Unknown levels fall back to info
        let log_level = lookup(LOG_LEVEL)
            .and_then(|value| value.parse().ok())
            .unwrap_or(Level::INFO);

        let username = lookup(USERNAME).ok_or(ConfigError::Missing(USERNAME))?;
        let password = lookup(PASSWORD).ok_or(ConfigError::Missing(PASSWORD))?;

        let provisioning_mode = match lookup(PROVISIONING_MODE) {
            Some(value) => parse_mode(&value)?,
            None => ProvisioningMode::Synchronous,
        };

        let instance_limit = lookup(INSTANCE_LIMIT)
            .map(|value| {
                value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    name: INSTANCE_LIMIT,
                    value: value.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            port,
            log_level,
            credentials: BrokerCredentials::new(username, password),
            catalog_path: lookup(CATALOG_PATH).map(PathBuf::from),
            provisioning_mode,
            instance_limit,
        })
    }

    /// Catalog for the in-memory broker; empty when no path is configured
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Catalog {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::Catalog {
            path: path.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_mode(value: &str) -> Result<ProvisioningMode, ConfigError> {
    match value {
        "sync" => Ok(ProvisioningMode::Synchronous),
        "async" => Ok(ProvisioningMode::Asynchronous),
        "async-only" => Ok(ProvisioningMode::AsynchronousOnly),
        other => Err(ConfigError::Invalid {
            name: PROVISIONING_MODE,
            value: other.to_string(),
            reason: "expected one of sync, async, async-only".into(),
        }),
    }
}
