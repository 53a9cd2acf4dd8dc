//! Locating the current master: a fixed address, or a leader lookup on
//! every connect attempt.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mc_domain::config::ClientConfig;
use mc_domain::{AddressParseError, MasterAddress};

use crate::types::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("leader lookup failed: {0}")]
    Lookup(String),
    #[error("leader lookup returned an unusable address: {0}")]
    Parse(#[from] AddressParseError),
}

/// External leader-discovery collaborator.
#[async_trait]
pub trait LeaderLookup: Send + Sync {
    /// The current leader as an unparsed `host:port` string.
    async fn current_master_address(&self) -> Result<String, ResolutionError>;
}

/// Resolves the address to connect to. Cheap to clone.
#[derive(Clone)]
pub enum AddressResolver {
    /// Always the same address; no lookup is performed.
    Static(MasterAddress),
    /// Ask leader discovery on every call.
    Discovery(Arc<dyn LeaderLookup>),
}

impl fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(addr) => f.debug_tuple("Static").field(addr).finish(),
            Self::Discovery(_) => f.write_str("Discovery"),
        }
    }
}

impl AddressResolver {
    /// Build the resolver the config asks for: HTTP leader discovery when
    /// `leader.enabled`, otherwise the static `master.address`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        if config.leader.enabled {
            let base = config
                .leader
                .discovery_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    ClientError::Config("leader discovery enabled without discovery_url".into())
                })?;
            let lookup = HttpLeaderLookup::new(base, &config.leader.leader_path)?;
            return Ok(Self::Discovery(Arc::new(lookup)));
        }

        let raw = config
            .master
            .address
            .as_deref()
            .ok_or_else(|| ClientError::Config("master.address is required".into()))?;
        let address = raw
            .parse()
            .map_err(|e: AddressParseError| ClientError::Config(format!("master.address: {e}")))?;
        Ok(Self::Static(address))
    }

    pub async fn resolve(&self) -> Result<MasterAddress, ResolutionError> {
        match self {
            Self::Static(address) => Ok(address.clone()),
            Self::Discovery(lookup) => {
                let raw = lookup.current_master_address().await?;
                let address = raw.parse::<MasterAddress>()?;
                tracing::debug!(leader = %address, "resolved current master");
                Ok(address)
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP leader lookup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Leader lookup over HTTP: `GET {discovery_url}{leader_path}` returns the
/// leader's `host:port` as plain text.
#[derive(Debug, Clone)]
pub struct HttpLeaderLookup {
    http: reqwest::Client,
    url: String,
}

impl HttpLeaderLookup {
    pub fn new(discovery_url: &str, leader_path: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Config(format!("leader lookup client: {e}")))?;
        let url = format!(
            "{}/{}",
            discovery_url.trim_end_matches('/'),
            leader_path.trim_start_matches('/')
        );
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LeaderLookup for HttpLeaderLookup {
    async fn current_master_address(&self) -> Result<String, ResolutionError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ResolutionError::Lookup(format!("{}: {e}", self.url)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| ResolutionError::Lookup(format!("{}: {e}", self.url)))?;
        let body = resp
            .text()
            .await
            .map_err(|e| ResolutionError::Lookup(format!("{}: {e}", self.url)))?;
        Ok(body.trim().to_owned())
    }
}
