//! Typed dispatch events
//!
//! Dispatch payloads decode into a tagged union keyed by the event kind,
//! so every event's payload has a statically known shape. Unknown kinds
//! never construct an `Event`; they are ignored at the shard.

use crate::shard::ShardId;
use ripcord_core::{Guild, Message};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kinds the client recognizes
///
/// These are the names sent in the `t` field of dispatch frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// First dispatch after a successful Identify
    Ready,
    /// Guild available, joined, or lazily loaded
    GuildCreate,
    /// New message
    MessageCreate,
}

impl EventKind {
    /// Get the string representation of the event kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::GuildCreate => "GUILD_CREATE",
            Self::MessageCreate => "MESSAGE_CREATE",
        }
    }

    /// Parse a dispatch name; unknown names return `None`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "READY" => Some(Self::Ready),
            "GUILD_CREATE" => Some(Self::GuildCreate),
            "MESSAGE_CREATE" => Some(Self::MessageCreate),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event emitted by a shard toward the cluster's subscribers.
///
/// Ephemeral: produced by the receive loop, consumed by handlers, never
/// persisted.
#[derive(Debug, Clone)]
pub enum Event {
    /// The shard finished its opening handshake
    Ready { shard_id: ShardId },
    /// A guild became known for the first time
    GuildCreate { shard_id: ShardId, guild: Guild },
    /// A message arrived
    MessageCreate { shard_id: ShardId, message: Message },
}

impl Event {
    /// The kind this event is published under
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Ready { .. } => EventKind::Ready,
            Self::GuildCreate { .. } => EventKind::GuildCreate,
            Self::MessageCreate { .. } => EventKind::MessageCreate,
        }
    }

    /// The shard that produced this event
    #[must_use]
    pub const fn shard_id(&self) -> ShardId {
        match self {
            Self::Ready { shard_id }
            | Self::GuildCreate { shard_id, .. }
            | Self::MessageCreate { shard_id, .. } => *shard_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!(EventKind::parse("READY"), Some(EventKind::Ready));
        assert_eq!(EventKind::parse("GUILD_CREATE"), Some(EventKind::GuildCreate));
        assert_eq!(EventKind::parse("MESSAGE_CREATE"), Some(EventKind::MessageCreate));
    }

    #[test]
    fn test_unknown_kind_is_none() {
        assert_eq!(EventKind::parse("TYPING_START"), None);
        assert_eq!(EventKind::parse(""), None);
    }

    #[test]
    fn test_event_kind_and_shard() {
        let event = Event::GuildCreate {
            shard_id: ShardId(3),
            guild: Guild::default(),
        };
        assert_eq!(event.kind(), EventKind::GuildCreate);
        assert_eq!(event.shard_id(), ShardId(3));
    }
}
