//! # ripcord-core
//!
//! Wire entities and value objects shared by every ripcord layer.
//! This crate knows nothing about transports; it only models what the
//! platform sends and receives.

pub mod embed;
pub mod entities;
pub mod error;
pub mod permissions;
pub mod snowflake;

// Re-export commonly used types at crate root
pub use embed::{Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, EmbedThumbnail};
pub use entities::{Activity, ActivityType, Guild, Invite, Message, Presence, Status, User};
pub use error::DomainError;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
