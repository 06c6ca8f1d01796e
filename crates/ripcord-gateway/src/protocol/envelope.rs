//! Gateway envelopes
//!
//! Every frame crossing the socket is one of two shapes: outbound
//! `{op, d}` and inbound `{op, d, s?, t?}`. The inbound `d` stays a raw
//! JSON value until the opcode (and event name, for dispatches) selects a
//! typed decode.

use super::{Hello, Identify, OpCode, Resume};
use ripcord_core::Presence;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A frame the client sends
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    pub op: OpCode,
    pub d: Value,
}

impl OutboundFrame {
    /// Heartbeat (op 1) carrying the last seen sequence
    #[must_use]
    pub fn heartbeat(sequence: u64) -> Self {
        Self {
            op: OpCode::Heartbeat,
            d: Value::from(sequence),
        }
    }

    /// Identify (op 2)
    pub fn identify(payload: &Identify) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::Identify,
            d: serde_json::to_value(payload)?,
        })
    }

    /// Resume (op 6)
    pub fn resume(payload: &Resume) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::Resume,
            d: serde_json::to_value(payload)?,
        })
    }

    /// Status Update (op 3)
    pub fn status_update(presence: &Presence) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::StatusUpdate,
            d: serde_json::to_value(presence)?,
        })
    }

    /// Serialize to the wire representation
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A frame the server sends
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub op: OpCode,
    #[serde(default)]
    pub d: Option<Value>,
    /// Sequence number (dispatches only)
    #[serde(default)]
    pub s: Option<u64>,
    /// Event name (dispatches only)
    #[serde(default)]
    pub t: Option<String>,
}

impl InboundFrame {
    /// Deserialize from the wire representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decode the Hello payload (op 10)
    pub fn as_hello(&self) -> Option<Hello> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Whether an Invalid Session (op 9) is flagged resumable
    pub fn invalid_session_resumable(&self) -> bool {
        self.d.as_ref().and_then(Value::as_bool).unwrap_or(false)
    }
}

impl std::fmt::Display for InboundFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "InboundFrame(op={}, t={t}", self.op)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "InboundFrame(op={})", self.op)
        }
    }
}
