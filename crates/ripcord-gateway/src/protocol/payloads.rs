//! Gateway payload structs
//!
//! The typed `d` bodies of the control frames the client exchanges during
//! a session's lifecycle.

use ripcord_core::{Guild, Presence, User};
use serde::{Deserialize, Serialize};

/// Hello (op 10) - first frame the server sends after the socket opens
#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    /// Interval between heartbeats, milliseconds
    pub heartbeat_interval: u64,
    #[serde(default, rename = "_trace")]
    pub trace: Vec<String>,
}

/// Client metadata sent with Identify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    #[serde(rename = "$os")]
    pub os: String,
    #[serde(rename = "$browser")]
    pub browser: String,
    #[serde(rename = "$device")]
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "ripcord".to_string(),
            device: "ripcord".to_string(),
        }
    }
}

/// Identify (op 2) - authenticate a fresh session
#[derive(Debug, Clone, Serialize)]
pub struct Identify {
    pub token: String,
    pub properties: IdentifyProperties,
    /// `[shard index, shard total]`
    pub shard: [u32; 2],
    pub presence: Presence,
    pub large_threshold: u32,
}

/// Resume (op 6) - reattach to a previous session
#[derive(Debug, Clone, Serialize)]
pub struct Resume {
    pub token: String,
    #[serde(rename = "seq")]
    pub sequence: u64,
    pub session_id: String,
}

/// READY dispatch - confirms a fresh identify
#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    #[serde(default)]
    pub v: u8,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub guilds: Vec<Guild>,
    pub session_id: String,
}
