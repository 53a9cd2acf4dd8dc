//! Connection state machine: `Disconnected → Connecting → Connected`, with
//! `Closed` as the terminal state.
//!
//! A [`Session`] is only ever touched with the client-wide lock held. The
//! closed flag and the shutdown token live in the shared [`SessionContext`]
//! so `close()` can flip them without waiting for that lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mc_domain::MasterAddress;
use mc_protocol::MasterRequest;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::heartbeat::HeartbeatHandle;
use crate::resolver::AddressResolver;
use crate::retry::ReconnectBackoff;
use crate::transport::{CallOutcome, MasterChannel, RemoteError, TransportFactory};
use crate::types::{ClientError, ConnectCause, ConnectionState};

const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a session needs that outlives any single connection.
pub(crate) struct SessionContext {
    pub(crate) client_id: String,
    pub(crate) resolver: AddressResolver,
    pub(crate) factory: Arc<dyn TransportFactory>,
    pub(crate) backoff: ReconnectBackoff,
    pub(crate) heartbeat_period: Duration,
    pub(crate) shutdown: CancellationToken,
    closed: AtomicBool,
    state: watch::Sender<ConnectionState>,
}

impl SessionContext {
    pub(crate) fn new(
        client_id: String,
        resolver: AddressResolver,
        factory: Arc<dyn TransportFactory>,
        backoff: ReconnectBackoff,
        heartbeat_period: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            client_id,
            resolver,
            factory,
            backoff,
            heartbeat_period,
            shutdown: CancellationToken::new(),
            closed: AtomicBool::new(false),
            state,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the client closed, publish `Closed`, and wake every backoff
    /// sleep, connect attempt and in-flight call. Returns `true` for the
    /// first caller only.
    pub(crate) fn mark_closed(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::AcqRel);
        if first {
            self.state.send_replace(ConnectionState::Closed);
            self.shutdown.cancel();
        }
        first
    }

    /// Publish a state transition. Once closed only `Closed` is published.
    pub(crate) fn publish(&self, state: ConnectionState) {
        if self.is_closed() && state != ConnectionState::Closed {
            return;
        }
        self.state.send_replace(state);
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

/// A live, handshaken connection.
struct ActiveSession {
    address: MasterAddress,
    channel: Arc<dyn MasterChannel>,
    session_id: i64,
    heartbeat: HeartbeatHandle,
}

/// Connection state owned by one client.
#[derive(Default)]
pub(crate) struct Session {
    active: Option<ActiveSession>,
    last_address: Option<MasterAddress>,
}

impl Session {
    /// Server-assigned id; `None` unless connected.
    pub(crate) fn session_id(&self) -> Option<i64> {
        self.active.as_ref().map(|a| a.session_id)
    }

    pub(crate) fn address(&self) -> Option<&MasterAddress> {
        self.active
            .as_ref()
            .map(|a| &a.address)
            .or(self.last_address.as_ref())
    }

    #[cfg(test)]
    pub(crate) fn heartbeat_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.heartbeat.is_running())
    }

    /// Ensure the session is connected and return its channel.
    ///
    /// No-op when already connected. Otherwise runs one connect sequence:
    /// every attempt re-resolves the address, opens a transport and
    /// performs the handshake; failures back off according to a fresh
    /// [`RetrySequence`](crate::retry::RetrySequence) until it is
    /// exhausted.
    pub(crate) async fn connect(
        &mut self,
        ctx: &SessionContext,
    ) -> Result<Arc<dyn MasterChannel>, ClientError> {
        if let Some(active) = &self.active {
            return Ok(active.channel.clone());
        }

        self.disconnect(ctx).await;

        if ctx.is_closed() {
            return Err(ClientError::Closed);
        }

        let mut retry = ctx.backoff.sequence();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            ctx.publish(ConnectionState::Connecting);

            let attempt = tokio::select! {
                r = self.attempt(ctx) => r,
                _ = ctx.shutdown.cancelled() => return Err(ClientError::Closed),
            };
            let cause = match attempt {
                Ok(active) => {
                    let channel = active.channel.clone();
                    self.active = Some(active);
                    ctx.publish(ConnectionState::Connected);
                    return Ok(channel);
                }
                Err(cause) => cause,
            };

            tracing::error!(
                client_id = %ctx.client_id,
                attempt = attempts,
                master = ?self.last_address.as_ref().map(ToString::to_string),
                error = %cause,
                "failed to connect with master"
            );

            let Some(delay) = retry.next_delay() else {
                ctx.publish(ConnectionState::Disconnected);
                return Err(ClientError::Connection {
                    address: self.last_address.clone(),
                    attempts,
                    cause,
                });
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.shutdown.cancelled() => return Err(ClientError::Closed),
            }

            if ctx.is_closed() {
                return Err(ClientError::Closed);
            }
        }
    }

    /// One connect attempt: resolve, open, handshake, start heartbeat.
    async fn attempt(&mut self, ctx: &SessionContext) -> Result<ActiveSession, ConnectCause> {
        let address = ctx.resolver.resolve().await?;
        self.last_address = Some(address.clone());

        tracing::info!(
            client_id = %ctx.client_id,
            version = CLIENT_VERSION,
            master = %address,
            "connecting to master"
        );

        let channel = ctx.factory.open(&address).await?;

        let session_id = match handshake(channel.as_ref()).await {
            Ok(id) => id,
            Err(e) => {
                channel.close().await;
                return Err(ConnectCause::Handshake(e));
            }
        };

        tracing::info!(
            client_id = %ctx.client_id,
            master = %address,
            session_id,
            "session registered with master"
        );

        let heartbeat = HeartbeatHandle::spawn(
            channel.clone(),
            ctx.heartbeat_period,
            address.clone(),
            session_id,
        );

        Ok(ActiveSession {
            address,
            channel,
            session_id,
            heartbeat,
        })
    }

    /// Tear down the current connection, if any. The heartbeat has exited
    /// before the transport is closed. Idempotent.
    pub(crate) async fn disconnect(&mut self, ctx: &SessionContext) {
        if let Some(active) = self.active.take() {
            tracing::debug!(
                client_id = %ctx.client_id,
                master = %active.address,
                session_id = active.session_id,
                "disconnecting from master"
            );
            active.heartbeat.stop().await;
            active.channel.close().await;
        }
        ctx.publish(ConnectionState::Disconnected);
    }
}

async fn handshake(channel: &dyn MasterChannel) -> Result<i64, RemoteError> {
    let request = MasterRequest::GetUserId;
    match CallOutcome::<i64>::classify(request.method(), channel.invoke(&request).await) {
        CallOutcome::Success(id) => Ok(id),
        CallOutcome::DomainFailure(e) => Err(e.into()),
        CallOutcome::TransportFailure(e) => Err(e.into()),
    }
}
