//! Builder pattern for constructing a [`MasterClient`].

use std::sync::Arc;
use std::time::Duration;

use mc_domain::config::ClientConfig;
use mc_domain::MasterAddress;

use crate::client::MasterClient;
use crate::resolver::{AddressResolver, LeaderLookup};
use crate::retry::ReconnectBackoff;
use crate::session::SessionContext;
use crate::transport::TransportFactory;
use crate::types::ClientError;
use crate::ws::WsTransportFactory;

/// Fluent builder for [`MasterClient`].
///
/// Anything not set explicitly is taken from the [`ClientConfig`]
/// (defaults when no config is given).
///
/// # Example
///
/// ```rust,no_run
/// # use mc_client::{MasterClientBuilder, MasterAddress};
/// let client = MasterClientBuilder::new()
///     .static_master(MasterAddress::new("10.0.0.1", 9000))
///     .heartbeat_interval(std::time::Duration::from_secs(10))
///     .build()
///     .unwrap();
/// ```
pub struct MasterClientBuilder {
    config: ClientConfig,
    resolver: Option<AddressResolver>,
    transport: Option<Arc<dyn TransportFactory>>,
    backoff: Option<ReconnectBackoff>,
    client_id: Option<String>,
}

impl MasterClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            resolver: None,
            transport: None,
            backoff: None,
            client_id: None,
        }
    }

    /// Use this config for every setting not overridden below.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    // ── Address resolution ───────────────────────────────────────────

    /// Always connect to `address`.
    pub fn static_master(mut self, address: MasterAddress) -> Self {
        self.resolver = Some(AddressResolver::Static(address));
        self
    }

    /// Ask `lookup` for the leader on every connect attempt.
    pub fn leader_lookup(mut self, lookup: Arc<dyn LeaderLookup>) -> Self {
        self.resolver = Some(AddressResolver::Discovery(lookup));
        self
    }

    // ── Behavior ─────────────────────────────────────────────────────

    /// Override the transport (default: WebSocket per `[transport]`).
    pub fn transport(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.transport = Some(factory);
        self
    }

    /// Override the reconnect backoff policy.
    pub fn reconnect_backoff(mut self, backoff: ReconnectBackoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Keep-alive interval; the heartbeat ticks at half of it.
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat.interval_ms = interval.as_millis() as u64;
        self
    }

    /// Override the generated per-instance client id.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Build the [`MasterClient`]. Does not touch the network.
    pub fn build(self) -> Result<MasterClient, ClientError> {
        if self.config.heartbeat.interval_ms < 2 {
            return Err(ClientError::Config(
                "heartbeat interval must be at least 2ms".into(),
            ));
        }

        let resolver = match self.resolver {
            Some(r) => r,
            None => AddressResolver::from_config(&self.config)?,
        };
        let client_id = self
            .client_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(
                WsTransportFactory::new(&self.config.transport).client_id(client_id.clone()),
            ),
        };
        let backoff = self
            .backoff
            .unwrap_or_else(|| ReconnectBackoff::from(&self.config.retry));

        Ok(MasterClient::from_context(SessionContext::new(
            client_id,
            resolver,
            transport,
            backoff,
            self.config.heartbeat.tick_period(),
        )))
    }
}

impl Default for MasterClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_address_source_fails() {
        let err = MasterClientBuilder::new().build().err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn static_master_overrides_config() {
        let client = MasterClientBuilder::new()
            .static_master(MasterAddress::new("m", 19998))
            .client_id("test-client")
            .build()
            .unwrap();
        assert_eq!(client.client_id(), "test-client");
        assert!(!client.is_connected());
        assert!(!client.is_closed());
    }

    #[test]
    fn rejects_degenerate_heartbeat_interval() {
        let err = MasterClientBuilder::new()
            .static_master(MasterAddress::new("m", 19998))
            .heartbeat_interval(Duration::from_millis(1))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn from_config_uses_static_address() {
        let config = ClientConfig::from_toml_str("[master]\naddress = \"10.0.0.1:9000\"\n").unwrap();
        assert!(MasterClient::from_config(&config).is_ok());
    }
}
