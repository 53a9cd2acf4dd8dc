mod heartbeat;
mod leader;
mod master;
mod retry;
mod transport;

pub use heartbeat::*;
pub use leader::*;
pub use master::*;
pub use retry::*;
pub use transport::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::address::MasterAddress;
use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub master: MasterConfig,
    #[serde(default)]
    pub leader: LeaderConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Parse a TOML document. Missing sections and fields take defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
            .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Convenience constructor for a client pinned to one master address.
    pub fn with_static_master(address: &MasterAddress) -> Self {
        Self {
            master: MasterConfig {
                address: Some(address.to_string()),
            },
            ..Default::default()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ClientConfig {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.leader.enabled {
            if self.leader.discovery_url.as_deref().map_or(true, str::is_empty) {
                errors.push(ConfigError::error(
                    "leader.discovery_url",
                    "leader discovery is enabled but no discovery_url is set",
                ));
            }
            if self.master.address.is_some() {
                errors.push(ConfigError::warning(
                    "master.address",
                    "ignored while leader discovery is enabled",
                ));
            }
        } else {
            match &self.master.address {
                None => errors.push(ConfigError::error(
                    "master.address",
                    "a static master address is required when leader discovery is disabled",
                )),
                Some(raw) => {
                    if let Err(e) = raw.parse::<MasterAddress>() {
                        errors.push(ConfigError::error("master.address", e.to_string()));
                    }
                }
            }
        }

        if self.retry.base_delay_ms == 0 {
            errors.push(ConfigError::error(
                "retry.base_delay_ms",
                "base delay must be greater than 0",
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            errors.push(ConfigError::error(
                "retry.max_delay_ms",
                "max delay must not be smaller than base delay",
            ));
        }
        if self.retry.max_attempts == 0 {
            errors.push(ConfigError::warning(
                "retry.max_attempts",
                "0 means a single connect attempt with no retries",
            ));
        }

        if self.heartbeat.interval_ms < 2 {
            errors.push(ConfigError::error(
                "heartbeat.interval_ms",
                "interval must be at least 2ms",
            ));
        }

        if !self.transport.path.starts_with('/') {
            errors.push(ConfigError::error(
                "transport.path",
                "path must start with '/'",
            ));
        }

        errors
    }

    /// `true` when [`validate`](Self::validate) reports no errors (warnings
    /// are allowed).
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|e| e.severity != ConfigSeverity::Error)
    }
}
