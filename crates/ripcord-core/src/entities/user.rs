//! User entity

use crate::snowflake::Snowflake;
use serde::{Deserialize, Serialize};

/// A platform user or bot account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// CDN URL for the user's avatar, with the requested image size.
    ///
    /// Falls back to the discriminator-keyed default avatar when the user
    /// has not set one.
    pub fn avatar_url(&self, size: u16) -> String {
        match &self.avatar {
            Some(hash) => format!(
                "https://cdn.discordapp.com/avatars/{}/{hash}.png?size={size}",
                self.id
            ),
            None => {
                let index = self.discriminator.parse::<u16>().unwrap_or(0) % 5;
                format!("https://cdn.discordapp.com/embed/avatars/{index}.png")
            }
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.username, self.discriminator)
    }
}
