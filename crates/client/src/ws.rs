//! WebSocket transport: JSON [`RpcRequest`]/[`RpcReply`] frames multiplexed
//! over one socket.
//!
//! A reader task routes replies to waiting callers by request id. When the
//! socket ends, every pending request fails with [`TransportError::Closed`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use mc_domain::config::TransportConfig;
use mc_domain::MasterAddress;
use mc_protocol::{MasterRequest, RpcOutcome, RpcReply, RpcRequest};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::transport::{MasterChannel, RemoteError, TransportError, TransportFactory};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<parking_lot::Mutex<HashMap<u64, oneshot::Sender<RpcOutcome>>>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Factory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opens [`WsChannel`]s to `ws://host:port{path}`.
#[derive(Debug, Clone)]
pub struct WsTransportFactory {
    path: String,
    token: Option<String>,
    client_id: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl WsTransportFactory {
    pub fn new(cfg: &TransportConfig) -> Self {
        Self {
            path: cfg.path.clone(),
            token: cfg.token.clone(),
            client_id: None,
            connect_timeout: cfg.connect_timeout(),
            request_timeout: cfg.request_timeout(),
        }
    }

    /// Identify this client to the master (`client_id` query param).
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Build the full connection URL with auth params.
    fn build_url(&self, address: &MasterAddress) -> String {
        let mut url = format!("ws://{address}{}", self.path);
        let mut sep = if url.contains('?') { '&' } else { '?' };
        if let Some(token) = &self.token {
            url.push_str(&format!("{sep}token={token}"));
            sep = '&';
        }
        if let Some(id) = &self.client_id {
            url.push_str(&format!("{sep}client_id={id}"));
        }
        url
    }
}

#[async_trait]
impl TransportFactory for WsTransportFactory {
    async fn open(&self, address: &MasterAddress) -> Result<Arc<dyn MasterChannel>, TransportError> {
        let url = self.build_url(address);
        tracing::debug!(master = %address, "opening websocket");

        let (ws, _response) =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(&url))
                .await
                .map_err(|_| {
                    TransportError::Timeout(format!(
                        "connect to {address} after {:?}",
                        self.connect_timeout
                    ))
                })?
                .map_err(|e| TransportError::WebSocket(e.to_string()))?;

        Ok(Arc::new(WsChannel::start(ws, self.request_timeout)))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Channel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One open WebSocket to the master.
pub struct WsChannel {
    sink: Mutex<SplitSink<Socket, Message>>,
    pending: Pending,
    next_id: AtomicU64,
    alive: Arc<AtomicBool>,
    reader: parking_lot::Mutex<Option<JoinHandle<()>>>,
    request_timeout: Duration,
}

impl WsChannel {
    fn start(ws: Socket, request_timeout: Duration) -> Self {
        let (sink, stream) = ws.split();
        let pending: Pending = Arc::default();
        let alive = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_loop(stream, pending.clone(), alive.clone()));

        Self {
            sink: Mutex::new(sink),
            pending,
            next_id: AtomicU64::new(1),
            alive,
            reader: parking_lot::Mutex::new(Some(reader)),
            request_timeout,
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MasterChannel for WsChannel {
    async fn invoke(&self, request: &MasterRequest) -> Result<Value, RemoteError> {
        if !self.is_alive() {
            return Err(TransportError::Closed.into());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&RpcRequest {
            id,
            call: request.clone(),
        })
        .map_err(TransportError::from)?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        // The reader may have drained `pending` between the check above
        // and the insert.
        if !self.is_alive() {
            self.pending.lock().remove(&id);
            return Err(TransportError::Closed.into());
        }

        let sent = self.sink.lock().await.send(Message::Text(frame)).await;
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(TransportError::WebSocket(e.to_string()).into());
        }

        let outcome = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => return Err(TransportError::Closed.into()),
            Err(_) => {
                self.pending.lock().remove(&id);
                return Err(TransportError::Timeout(format!(
                    "{} after {:?}",
                    request.method(),
                    self.request_timeout
                ))
                .into());
            }
        };

        match outcome {
            RpcOutcome::Ok { result } => Ok(result),
            RpcOutcome::Rejected { error } => Err(RemoteError::Domain(error)),
        }
    }

    async fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
        let closing = async { self.sink.lock().await.close().await };
        if tokio::time::timeout(self.request_timeout, closing).await.is_err() {
            tracing::warn!(
                timeout_ms = self.request_timeout.as_millis() as u64,
                "websocket close did not complete, dropping socket"
            );
        }
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
        self.pending.lock().clear();
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
    }
}

async fn read_loop(mut stream: SplitStream<Socket>, pending: Pending, alive: Arc<AtomicBool>) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<RpcReply>(&text) {
                Ok(reply) => {
                    let waiter = pending.lock().remove(&reply.id);
                    match waiter {
                        Some(tx) => {
                            let _ = tx.send(reply.outcome);
                        }
                        None => tracing::debug!(id = reply.id, "reply for unknown request"),
                    }
                }
                Err(e) => tracing::debug!(error = %e, "failed to parse reply"),
            },
            Ok(Message::Close(_)) => {
                tracing::info!("master closed connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "websocket read failed");
                break;
            }
        }
    }

    alive.store(false, Ordering::SeqCst);
    // Dropping the senders wakes every waiter with `Closed`.
    pending.lock().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> WsTransportFactory {
        WsTransportFactory::new(&TransportConfig::default())
    }

    #[test]
    fn build_url_with_token_and_client_id() {
        let mut f = factory().client_id("c1");
        f.token = Some("secret".into());
        let url = f.build_url(&MasterAddress::new("10.0.0.1", 9000));
        assert_eq!(url, "ws://10.0.0.1:9000/v1/master/ws?token=secret&client_id=c1");
    }

    #[test]
    fn build_url_without_params() {
        let url = factory().build_url(&MasterAddress::new("m", 1));
        assert_eq!(url, "ws://m:1/v1/master/ws");
    }

    #[test]
    fn build_url_with_existing_query_params() {
        let mut f = factory().client_id("c1");
        f.path = "/ws?v=2".into();
        let url = f.build_url(&MasterAddress::new("m", 1));
        assert_eq!(url, "ws://m:1/ws?v=2&client_id=c1");
    }

    #[tokio::test]
    async fn open_to_dead_port_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = factory().open(&MasterAddress::new("127.0.0.1", port)).await;
        assert!(matches!(result, Err(TransportError::WebSocket(_))));
    }

    #[tokio::test]
    async fn close_gives_up_on_a_peer_that_stops_reading() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            // Hold the socket open without ever reading from it.
            std::future::pending::<()>().await;
        });

        let cfg = TransportConfig {
            request_timeout_ms: 200,
            ..TransportConfig::default()
        };
        let channel = WsTransportFactory::new(&cfg)
            .open(&MasterAddress::new("127.0.0.1", port))
            .await
            .unwrap();

        // Large enough to fill both socket buffers, so the send never
        // finishes and keeps the sink locked.
        let stuck = {
            let channel = channel.clone();
            tokio::spawn(async move {
                let request = MasterRequest::UpdateRawTableMetadata {
                    table_id: 1,
                    metadata: vec![255; 16 * 1024 * 1024],
                };
                channel.invoke(&request).await
            })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;

        let start = std::time::Instant::now();
        channel.close().await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(matches!(
            channel.invoke(&MasterRequest::GetUsedBytes).await,
            Err(RemoteError::Transport(TransportError::Closed))
        ));
        stuck.abort();
    }
}
