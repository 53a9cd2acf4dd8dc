//! `mc-client`: session manager for a leader-elected master.
//!
//! One [`MasterClient`] owns at most one live connection to the current
//! master. Every operation goes through the same dispatcher: connect if
//! needed, invoke once, and classify the outcome. Rejections from the
//! master are returned as-is. Transport failures drop the connection and
//! retry against a freshly resolved address.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  MasterClient (Clone, shared)                             │
//! │                                                           │
//! │   ops::*  ──►  dispatcher  ──►  Session (under lock)      │
//! │                                   │                       │
//! │                  AddressResolver ◄┤                       │
//! │                  ReconnectBackoff◄┤                       │
//! │                  TransportFactory◄┤──► MasterChannel      │
//! │                                   └──► HeartbeatHandle    │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Connection flow
//!
//! 1. Resolve the master address (static, or via leader discovery)
//! 2. Open a channel to it
//! 3. Handshake: `get_user_id` assigns the session id
//! 4. Start the background heartbeat at half the keep-alive interval
//! 5. On failure: back off exponentially, re-resolving every attempt,
//!    until the attempt budget is spent
//!
//! ```no_run
//! # async fn run() -> Result<(), mc_client::ClientError> {
//! let client = mc_client::MasterClient::builder()
//!     .static_master("10.0.0.1:19998".parse().expect("address"))
//!     .build()?;
//! let used = client.get_used_bytes().await?;
//! client.close().await;
//! # let _ = used;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
mod heartbeat;
mod ops;
pub mod resolver;
pub mod retry;
mod session;
pub mod transport;
pub mod types;
pub mod ws;

#[cfg(test)]
mod testing;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::MasterClientBuilder;
pub use client::MasterClient;
pub use resolver::{AddressResolver, HttpLeaderLookup, LeaderLookup, ResolutionError};
pub use retry::{ReconnectBackoff, RetrySequence};
pub use transport::{CallOutcome, MasterChannel, RemoteError, TransportError, TransportFactory};
pub use types::{ClientError, ConnectCause, ConnectionState};
pub use ws::{WsChannel, WsTransportFactory};

// Re-export the shared types so callers never need the lower crates directly.
pub use mc_domain::{ClientConfig, MasterAddress};
pub use mc_protocol::{
    BlockInfo, Command, CommandType, DependencyInfo, DependencySpec, DomainError,
    DomainErrorKind, FileInfo, NetAddress, RawTableInfo, StorageDirBlocks, WorkerInfo, UNSET_ID,
};
