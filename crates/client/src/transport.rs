//! Transport seams and failure classification.
//!
//! A [`TransportFactory`] opens a [`MasterChannel`] to an address; a channel
//! invokes one [`MasterRequest`] at a time from the caller's point of view
//! and yields either the raw JSON result or a [`RemoteError`].

use std::sync::Arc;

use async_trait::async_trait;
use mc_domain::MasterAddress;
use mc_protocol::{DomainError, MasterRequest};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// An open channel to the master.
#[async_trait]
pub trait MasterChannel: Send + Sync {
    /// Invoke one remote method and wait for its result.
    async fn invoke(&self, request: &MasterRequest) -> Result<Value, RemoteError>;

    /// Close the channel. Pending and later invocations fail with
    /// [`TransportError::Closed`].
    async fn close(&self);
}

/// Opens channels to a master address.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn open(&self, address: &MasterAddress) -> Result<Arc<dyn MasterChannel>, TransportError>;
}

/// The channel itself is suspect.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("websocket: {0}")]
    WebSocket(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("channel closed")]
    Closed,

    #[error("failed to decode {method} result: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// What a channel invocation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Classified outcome of one remote call. Drives whether the dispatcher
/// retries.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    DomainFailure(DomainError),
    TransportFailure(TransportError),
}

impl<T: DeserializeOwned> CallOutcome<T> {
    /// Classify a raw invocation result, decoding the success payload into
    /// `T`. A payload that does not decode is a transport failure.
    pub fn classify(method: &'static str, result: Result<Value, RemoteError>) -> Self {
        match result {
            Ok(value) => match serde_json::from_value(value) {
                Ok(v) => Self::Success(v),
                Err(source) => Self::TransportFailure(TransportError::Decode { method, source }),
            },
            Err(RemoteError::Domain(e)) => Self::DomainFailure(e),
            Err(RemoteError::Transport(e)) => Self::TransportFailure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_protocol::DomainErrorKind;
    use serde_json::json;

    #[test]
    fn success_decodes_payload() {
        let outcome = CallOutcome::<i64>::classify("get_user_id", Ok(json!(42)));
        assert!(matches!(outcome, CallOutcome::Success(42)));
    }

    #[test]
    fn null_payload_decodes_to_unit() {
        let outcome = CallOutcome::<()>::classify("user_heartbeat", Ok(Value::Null));
        assert!(matches!(outcome, CallOutcome::Success(())));
    }

    #[test]
    fn rejection_is_domain_failure() {
        let err = DomainError::new(DomainErrorKind::InvalidPath, "a/b");
        let outcome = CallOutcome::<bool>::classify("mkdirs", Err(err.into()));
        match outcome {
            CallOutcome::DomainFailure(e) => assert_eq!(e.kind, DomainErrorKind::InvalidPath),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn channel_error_is_transport_failure() {
        let outcome = CallOutcome::<bool>::classify("mkdirs", Err(TransportError::Closed.into()));
        assert!(matches!(
            outcome,
            CallOutcome::TransportFailure(TransportError::Closed)
        ));
    }

    #[test]
    fn undecodable_payload_is_transport_failure() {
        let outcome = CallOutcome::<i64>::classify("get_used_bytes", Ok(json!("lots")));
        assert!(matches!(
            outcome,
            CallOutcome::TransportFailure(TransportError::Decode {
                method: "get_used_bytes",
                ..
            })
        ));
    }
}
