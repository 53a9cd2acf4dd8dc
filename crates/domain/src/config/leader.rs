use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Leader discovery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderConfig {
    /// Ask the discovery service for the current leader on every connect
    /// attempt instead of using `master.address`.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the discovery service, e.g. `http://zk-proxy:2181`.
    #[serde(default)]
    pub discovery_url: Option<String>,
    /// Path under `discovery_url` that returns the leader's `host:port`.
    #[serde(default = "d_leader_path")]
    pub leader_path: String,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            discovery_url: None,
            leader_path: d_leader_path(),
        }
    }
}

fn d_leader_path() -> String {
    "/leader".into()
}
