//! Background keep-alive for one session.
//!
//! The loop pings the master every tick period. A failed ping is only
//! logged; reconnecting is left to the dispatcher on the next regular call.

use std::sync::Arc;
use std::time::Duration;

use mc_domain::MasterAddress;
use mc_protocol::MasterRequest;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::transport::MasterChannel;

/// Owning handle to a running heartbeat task. At most one per session.
///
/// Dropping the handle cancels the task without waiting for it; use
/// [`stop`](Self::stop) to wait until the task has exited.
pub(crate) struct HeartbeatHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatHandle {
    pub(crate) fn spawn(
        channel: Arc<dyn MasterChannel>,
        period: Duration,
        address: MasterAddress,
        session_id: i64,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(channel, period, address, session_id, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancel the task and wait for it to exit. An in-flight ping is
    /// abandoned and its outcome discarded.
    pub(crate) async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::warn!(error = %e, "heartbeat task panicked");
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    channel: Arc<dyn MasterChannel>,
    period: Duration,
    address: MasterAddress,
    session_id: i64,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;

    tracing::debug!(
        master = %address,
        session_id,
        period_ms = period.as_millis() as u64,
        "heartbeat started"
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            r = channel.invoke(&MasterRequest::UserHeartbeat) => r,
        };

        match result {
            Ok(_) => {
                if failures > 0 {
                    tracing::info!(master = %address, session_id, failures, "heartbeat recovered");
                }
                failures = 0;
                tracing::trace!(session_id, "heartbeat ok");
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    master = %address,
                    session_id,
                    failures,
                    error = %e,
                    "heartbeat to master failed"
                );
            }
        }
    }

    tracing::debug!(master = %address, session_id, "heartbeat stopped");
}
