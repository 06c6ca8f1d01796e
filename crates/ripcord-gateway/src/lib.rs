//! # ripcord-gateway
//!
//! The persistent event-streaming side of the client: one [`Shard`] per
//! gateway connection, each running a receive loop and a heartbeat loop,
//! decoding dispatches into typed [`Event`]s.

pub mod events;
pub mod protocol;
pub mod shard;

mod error;

pub use error::{GatewayError, GatewayResult};
pub use events::{Event, EventKind};
pub use shard::{SessionState, Shard, ShardConfig, ShardId};
