//! Client-facing error and state types.

use std::fmt;

use mc_domain::MasterAddress;
use mc_protocol::{DomainError, DomainErrorKind};

use crate::resolver::ResolutionError;
use crate::transport::{RemoteError, TransportError};

/// Observable connection state of a [`MasterClient`](crate::MasterClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Why the last attempt of a connect sequence failed.
#[derive(thiserror::Error, Debug)]
pub enum ConnectCause {
    #[error("resolution: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("handshake: {0}")]
    Handshake(RemoteError),
}

/// Error surfaced by every [`MasterClient`](crate::MasterClient) operation.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("config: {0}")]
    Config(String),

    /// Rejected locally; the network was not touched.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The master rejected the request on its merits.
    #[error("master rejected request: {0}")]
    Domain(#[from] DomainError),

    /// Reconnect budget exhausted.
    #[error(
        "failed to connect with master @ {} after {attempts} attempts: {cause}",
        .address.as_ref().map_or_else(|| "<unresolved>".to_string(), ToString::to_string)
    )]
    Connection {
        address: Option<MasterAddress>,
        attempts: u32,
        #[source]
        cause: ConnectCause,
    },

    #[error("client is closed")]
    Closed,
}

impl ClientError {
    /// Rejection kind, if the master rejected the request.
    pub fn domain_kind(&self) -> Option<DomainErrorKind> {
        match self {
            Self::Domain(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
