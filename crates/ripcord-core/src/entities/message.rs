//! Message entity

use crate::entities::User;
use crate::error::DomainError;
use crate::snowflake::Snowflake;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message delivered over MESSAGE_CREATE or returned by the REST API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub author: User,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub mention_everyone: bool,
}

impl Message {
    /// When the message was created (wire timestamps are RFC 3339)
    pub fn created_at(&self) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DomainError::InvalidTimestamp(e.to_string()))
    }

    /// When the message was last edited, if it ever was
    pub fn edited_at(&self) -> Result<DateTime<Utc>, DomainError> {
        let edited = self.edited_timestamp.as_ref().ok_or(DomainError::NotEdited)?;
        DateTime::parse_from_rfc3339(edited)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DomainError::InvalidTimestamp(e.to_string()))
    }
}
