//! Sharded gateway client.
//!
//! A [`Cluster`] owns one [`Shard`](ripcord_gateway::Shard) per shard id,
//! fans their events out through a subscribe/publish [`EventBus`], and
//! routes REST calls through per-shard rate limiters. The lower-level
//! crates (`ripcord-gateway`, `ripcord-rest`, `ripcord-core`) can also be
//! used on their own.

pub mod api;
pub mod bus;
pub mod cluster;
pub mod oauth2;
pub mod options;
pub mod telemetry;

mod error;

pub use bus::EventBus;
pub use cluster::Cluster;
pub use error::{ClusterError, ClusterResult};
pub use options::ClusterOptions;

pub use ripcord_core::{Embed, Guild, Invite, Message, Presence, Snowflake, User};
pub use ripcord_gateway::{Event, EventKind, Shard, ShardId};
pub use ripcord_rest::{Attachment, RestError, RestManager};
