//! Scripted in-memory master for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mc_domain::MasterAddress;
use mc_protocol::{DomainError, MasterRequest};
use parking_lot::Mutex;
use serde_json::Value;

use crate::resolver::{LeaderLookup, ResolutionError};
use crate::transport::{MasterChannel, RemoteError, TransportError, TransportFactory};

/// Scripted reply for a non-handshake, non-heartbeat call.
pub(crate) enum Reply {
    Value(Value),
    Rejected(DomainError),
    /// The channel breaks mid-call.
    Broken,
}

/// Shared state of the fake master. Also acts as the transport factory.
#[derive(Default)]
pub(crate) struct MockMaster {
    opens: AtomicUsize,
    open_failures: Mutex<u32>,
    handshake_failures: Mutex<u32>,
    addresses: Mutex<Vec<MasterAddress>>,
    calls: Mutex<Vec<MasterRequest>>,
    replies: Mutex<VecDeque<Reply>>,
    heartbeats: AtomicUsize,
    heartbeat_failing: AtomicBool,
    hang_handshakes: AtomicBool,
    hang_heartbeats: AtomicBool,
    hang_calls: AtomicBool,
    panic_heartbeats: AtomicBool,
    closed_channels: AtomicUsize,
    next_session_id: AtomicI64,
}

impl MockMaster {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next_session_id: AtomicI64::new(42),
            ..Default::default()
        })
    }

    /// Fail the next `n` transport opens.
    pub(crate) fn fail_opens(&self, n: u32) {
        *self.open_failures.lock() = n;
    }

    /// Fail the next `n` handshakes with a transport error.
    pub(crate) fn fail_handshakes(&self, n: u32) {
        *self.handshake_failures.lock() = n;
    }

    pub(crate) fn push_reply(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    pub(crate) fn set_heartbeat_failing(&self, failing: bool) {
        self.heartbeat_failing.store(failing, Ordering::SeqCst);
    }

    /// `get_user_id` never answers.
    pub(crate) fn hang_handshakes(&self) {
        self.hang_handshakes.store(true, Ordering::SeqCst);
    }

    /// Heartbeat pings are recorded but never answered.
    pub(crate) fn hang_heartbeats(&self) {
        self.hang_heartbeats.store(true, Ordering::SeqCst);
    }

    /// Regular calls are recorded but never answered.
    pub(crate) fn hang_calls(&self) {
        self.hang_calls.store(true, Ordering::SeqCst);
    }

    /// Heartbeat pings panic the calling task.
    pub(crate) fn panic_heartbeats(&self) {
        self.panic_heartbeats.store(true, Ordering::SeqCst);
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn addresses(&self) -> Vec<MasterAddress> {
        self.addresses.lock().clone()
    }

    /// Recorded calls, excluding handshakes and heartbeats.
    pub(crate) fn calls(&self) -> Vec<MasterRequest> {
        self.calls.lock().clone()
    }

    pub(crate) fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    pub(crate) fn closed_channels(&self) -> usize {
        self.closed_channels.load(Ordering::SeqCst)
    }

    /// A channel that is already open, bypassing `open`.
    pub(crate) fn channel(self: &Arc<Self>) -> Arc<dyn MasterChannel> {
        Arc::new(MockChannel {
            master: self.clone(),
            open: AtomicBool::new(true),
        })
    }

    fn take_one(counter: &Mutex<u32>) -> bool {
        let mut n = counter.lock();
        if *n > 0 {
            *n -= 1;
            true
        } else {
            false
        }
    }
}

/// Transport factory backed by a [`MockMaster`].
pub(crate) struct MockFactory(pub(crate) Arc<MockMaster>);

#[async_trait]
impl TransportFactory for MockFactory {
    async fn open(&self, address: &MasterAddress) -> Result<Arc<dyn MasterChannel>, TransportError> {
        let master = &self.0;
        master.opens.fetch_add(1, Ordering::SeqCst);
        master.addresses.lock().push(address.clone());
        if MockMaster::take_one(&master.open_failures) {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(master.channel())
    }
}

struct MockChannel {
    master: Arc<MockMaster>,
    open: AtomicBool,
}

#[async_trait]
impl MasterChannel for MockChannel {
    async fn invoke(&self, request: &MasterRequest) -> Result<Value, RemoteError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(TransportError::Closed.into());
        }
        let master = &self.master;
        match request {
            MasterRequest::GetUserId => {
                if master.hang_handshakes.load(Ordering::SeqCst) {
                    std::future::pending::<()>().await;
                }
                if MockMaster::take_one(&master.handshake_failures) {
                    return Err(TransportError::Timeout("get_user_id".into()).into());
                }
                let id = master.next_session_id.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from(id))
            }
            MasterRequest::UserHeartbeat => {
                master.heartbeats.fetch_add(1, Ordering::SeqCst);
                if master.panic_heartbeats.load(Ordering::SeqCst) {
                    panic!("heartbeat handler blew up");
                }
                if master.hang_heartbeats.load(Ordering::SeqCst) {
                    std::future::pending::<()>().await;
                }
                if master.heartbeat_failing.load(Ordering::SeqCst) {
                    Err(TransportError::Closed.into())
                } else {
                    Ok(Value::Null)
                }
            }
            other => {
                master.calls.lock().push(other.clone());
                if master.hang_calls.load(Ordering::SeqCst) {
                    std::future::pending::<()>().await;
                }
                let reply = master.replies.lock().pop_front();
                match reply {
                    None => Ok(Value::Null),
                    Some(Reply::Value(v)) => Ok(v),
                    Some(Reply::Rejected(e)) => Err(e.into()),
                    Some(Reply::Broken) => {
                        self.open.store(false, Ordering::SeqCst);
                        Err(TransportError::Closed.into())
                    }
                }
            }
        }
    }

    async fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.master.closed_channels.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Leader lookup that answers from a script; repeats the last answer once
/// the script runs out.
pub(crate) struct ScriptedLookup {
    answers: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    failures: Mutex<u32>,
    lookups: AtomicUsize,
}

impl ScriptedLookup {
    pub(crate) fn new<I, S>(answers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            failures: Mutex::new(0),
            lookups: AtomicUsize::new(0),
        })
    }

    /// A lookup that always fails.
    pub(crate) fn failing() -> Arc<Self> {
        Self::new(Vec::<String>::new())
    }

    /// Fail the next `n` lookups.
    pub(crate) fn fail_next(&self, n: u32) {
        *self.failures.lock() = n;
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeaderLookup for ScriptedLookup {
    async fn current_master_address(&self) -> Result<String, ResolutionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if MockMaster::take_one(&self.failures) {
            return Err(ResolutionError::Lookup("discovery unavailable".into()));
        }
        let next = self.answers.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(answer) = next {
            *last = Some(answer);
        }
        last.clone()
            .ok_or_else(|| ResolutionError::Lookup("no leader elected".into()))
    }
}
