//! `host:port` address of the master.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Network address of the (current) master.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasterAddress {
    pub host: String,
    pub port: u16,
}

impl MasterAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for MasterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("missing port in address {0:?}")]
    MissingPort(String),
    #[error("empty host in address {0:?}")]
    EmptyHost(String),
    #[error("invalid port in address {0:?}")]
    InvalidPort(String),
}

impl FromStr for MasterAddress {
    type Err = AddressParseError;

    /// Parse `host:port`, `[v6]:port`, tolerating surrounding whitespace and
    /// a leading `/` (leader records sometimes carry one).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix('/').unwrap_or(raw);

        let (host, port) = raw
            .rsplit_once(':')
            .ok_or_else(|| AddressParseError::MissingPort(s.to_owned()))?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if host.is_empty() {
            return Err(AddressParseError::EmptyHost(s.to_owned()));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| AddressParseError::InvalidPort(s.to_owned()))?;
        if port == 0 {
            return Err(AddressParseError::InvalidPort(s.to_owned()));
        }

        Ok(Self::new(host, port))
    }
}
