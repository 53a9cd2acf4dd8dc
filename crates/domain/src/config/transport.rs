use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// WebSocket path served by the master.
    #[serde(default = "d_path")]
    pub path: String,
    /// Shared-secret token sent as the `token` query parameter.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "d_5000")]
    pub connect_timeout_ms: u64,
    #[serde(default = "d_30000")]
    pub request_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            path: d_path(),
            token: None,
            connect_timeout_ms: 5000,
            request_timeout_ms: 30_000,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn d_path() -> String {
    "/v1/master/ws".into()
}
fn d_5000() -> u64 {
    5000
}
fn d_30000() -> u64 {
    30_000
}
