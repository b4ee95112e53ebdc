//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};

use bsq_types::NetworkId;

use crate::error::NodeError;

/// Which block acquisition strategy the node runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Parses blocks validated by a local Bitcoin node.
    Full,
    /// Requests serialized blocks from a full-node peer.
    Lite,
}

/// Configuration for a BSQ DAO node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which Bitcoin network the DAO state is derived from.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Node role: "full" or "lite".
    #[serde(default = "default_role")]
    pub role: NodeRole,

    /// Take a state snapshot every this many blocks.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u32,

    /// Maximum blocks per catch-up request; a shorter batch means the
    /// source's tip was reached.
    #[serde(default = "default_catch_up_batch_size")]
    pub catch_up_batch_size: usize,

    /// Capacity of the bounded event channel from acquisition to the sync
    /// controller.
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Seconds to wait before retrying an unavailable block source.
    #[serde(default = "default_source_retry_secs")]
    pub source_retry_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Regtest
}

fn default_role() -> NodeRole {
    NodeRole::Lite
}

fn default_snapshot_interval() -> u32 {
    10
}

fn default_catch_up_batch_size() -> usize {
    500
}

fn default_event_queue_capacity() -> usize {
    16
}

fn default_source_retry_secs() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            role: default_role(),
            snapshot_interval: default_snapshot_interval(),
            catch_up_batch_size: default_catch_up_batch_size(),
            event_queue_capacity: default_event_queue_capacity(),
            source_retry_secs: default_source_retry_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
