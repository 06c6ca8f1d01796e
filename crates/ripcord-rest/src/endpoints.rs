//! REST endpoint paths
//!
//! Helper constructors for the routes the client calls. Paths are relative
//! to the API base URL.

use ripcord_core::Snowflake;

/// `/channels/{channel}/messages`
pub fn channel_messages(channel_id: Snowflake) -> String {
    format!("/channels/{channel_id}/messages")
}

/// `/channels/{channel}/messages/{message}`
pub fn channel_message(channel_id: Snowflake, message_id: Snowflake) -> String {
    format!("/channels/{channel_id}/messages/{message_id}")
}

/// `/channels/{channel}/messages/bulk-delete`
pub fn channel_bulk_delete(channel_id: Snowflake) -> String {
    format!("/channels/{channel_id}/messages/bulk-delete")
}

/// `/channels/{channel}/messages/{message}/reactions/{emoji}/{user}`
///
/// `user` is a snowflake or the literal `@me`.
pub fn channel_message_reaction(
    channel_id: Snowflake,
    message_id: Snowflake,
    emoji: &str,
    user: &str,
) -> String {
    format!("/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/{user}")
}

/// `/channels/{channel}/messages/{message}/reactions`
pub fn channel_message_reactions_all(channel_id: Snowflake, message_id: Snowflake) -> String {
    format!("/channels/{channel_id}/messages/{message_id}/reactions")
}

/// `/invites/{code}`
pub fn invite(code: &str) -> String {
    format!("/invites/{code}")
}

/// `/users/{user}` — `user` is a snowflake or `@me`
pub fn user(user: &str) -> String {
    format!("/users/{user}")
}

/// `/users/{user}/guilds/{guild}`
pub fn user_guild(user: &str, guild_id: Snowflake) -> String {
    format!("/users/{user}/guilds/{guild_id}")
}

/// `/gateway/bot` — gateway URL + recommended shard count
pub const GATEWAY_BOT: &str = "/gateway/bot";
