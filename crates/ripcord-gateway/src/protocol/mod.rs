//! Gateway wire protocol
//!
//! Opcodes, envelopes and the payload structs exchanged over the
//! WebSocket connection.

mod envelope;
mod opcodes;
mod payloads;

pub use envelope::{InboundFrame, OutboundFrame};
pub use opcodes::OpCode;
pub use payloads::{Hello, Identify, IdentifyProperties, Ready, Resume};

/// Gateway protocol version negotiated in the connection URL
pub const API_VERSION: u8 = 6;
