//! The shared master client: lifecycle operations and the generic
//! connect-then-call dispatcher every facade operation goes through.

use std::sync::Arc;

use mc_domain::config::ClientConfig;
use mc_domain::MasterAddress;
use mc_protocol::MasterRequest;
use serde::de::DeserializeOwned;
use tokio::sync::{watch, Mutex};

use crate::builder::MasterClientBuilder;
use crate::session::{Session, SessionContext};
use crate::transport::CallOutcome;
use crate::types::{ClientError, ConnectionState};

/// Client session with the master. Clones share one session.
///
/// Create via [`MasterClientBuilder`] or [`MasterClient::from_config`].
#[derive(Clone)]
pub struct MasterClient {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: SessionContext,
    /// Client-wide lock: state transitions and whole dispatch loops run
    /// under it.
    session: Mutex<Session>,
}

impl MasterClient {
    /// Start a new builder.
    pub fn builder() -> MasterClientBuilder {
        MasterClientBuilder::new()
    }

    /// Build a client with the WebSocket transport and the resolver the
    /// config describes.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        MasterClientBuilder::new().config(config.clone()).build()
    }

    pub(crate) fn from_context(ctx: SessionContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                session: Mutex::new(Session::default()),
            }),
        }
    }

    /// Per-instance id used in logs and in the transport handshake.
    pub fn client_id(&self) -> &str {
        &self.inner.ctx.client_id
    }

    // ── lifecycle ────────────────────────────────────────────────────

    /// Connect to the master. No-op when already connected.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut session = self.inner.session.lock().await;
        session.connect(&self.inner.ctx).await.map(|_| ())
    }

    /// Drop the current connection. The client stays usable; the next call
    /// reconnects.
    pub async fn disconnect(&self) {
        let mut session = self.inner.session.lock().await;
        session.disconnect(&self.inner.ctx).await;
    }

    /// Disconnect and reconnect, e.g. after the leader may have moved. A
    /// failed reconnect is logged rather than returned.
    pub async fn reset_connection(&self) {
        let mut session = self.inner.session.lock().await;
        session.disconnect(&self.inner.ctx).await;
        if let Err(e) = session.connect(&self.inner.ctx).await {
            tracing::error!(
                client_id = %self.inner.ctx.client_id,
                error = %e,
                "failed to reset the connection with master"
            );
        }
    }

    /// Permanently close the client. Stops the heartbeat, wakes any
    /// backoff sleep or in-flight call, and makes every later operation
    /// fail with [`ClientError::Closed`]. Idempotent.
    pub async fn close(&self) {
        let ctx = &self.inner.ctx;
        if ctx.mark_closed() {
            tracing::info!(client_id = %ctx.client_id, "closing master client");
        }
        let mut session = self.inner.session.lock().await;
        session.disconnect(ctx).await;
        ctx.publish(ConnectionState::Closed);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.ctx.is_closed()
    }

    pub fn is_connected(&self) -> bool {
        !self.is_closed() && self.state() == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.ctx.state()
    }

    /// Watch connection state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.ctx.subscribe()
    }

    /// Session id if currently connected. Never connects.
    pub async fn current_session_id(&self) -> Option<i64> {
        self.inner.session.lock().await.session_id()
    }

    /// Address of the current (or most recently tried) master.
    pub async fn master_address(&self) -> Option<MasterAddress> {
        self.inner.session.lock().await.address().cloned()
    }

    /// Server-assigned session id, connecting first if necessary.
    pub async fn session_id(&self) -> Result<i64, ClientError> {
        let ctx = &self.inner.ctx;
        if ctx.is_closed() {
            return Err(ClientError::Closed);
        }
        let mut session = self.inner.session.lock().await;
        session.connect(ctx).await?;
        session.session_id().ok_or(ClientError::Closed)
    }

    // ── dispatcher ───────────────────────────────────────────────────

    /// Run one remote call: ensure connected, invoke, classify.
    ///
    /// Domain failures are returned as-is and leave the session untouched.
    /// Transport failures drop the connection and loop back to connect;
    /// the only bound is the connect sequence's retry budget.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        request: MasterRequest,
    ) -> Result<T, ClientError> {
        let ctx = &self.inner.ctx;
        let method = request.method();

        if ctx.is_closed() {
            return Err(ClientError::Closed);
        }

        let mut session = self.inner.session.lock().await;
        loop {
            if ctx.is_closed() {
                return Err(ClientError::Closed);
            }

            let channel = session.connect(ctx).await?;

            let result = tokio::select! {
                r = channel.invoke(&request) => r,
                _ = ctx.shutdown.cancelled() => return Err(ClientError::Closed),
            };

            match CallOutcome::<T>::classify(method, result) {
                CallOutcome::Success(value) => return Ok(value),
                CallOutcome::DomainFailure(e) => {
                    tracing::debug!(method, error = %e, "master rejected request");
                    return Err(ClientError::Domain(e));
                }
                CallOutcome::TransportFailure(e) => {
                    tracing::warn!(
                        client_id = %ctx.client_id,
                        method,
                        session_id = ?session.session_id(),
                        error = %e,
                        "transport failure, reconnecting"
                    );
                    session.disconnect(ctx).await;
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn heartbeat_running(&self) -> bool {
        self.inner.session.lock().await.heartbeat_running()
    }
}
