//! Channel message operations

use crate::cluster::Cluster;
use crate::error::ClusterResult;
use ripcord_core::{DomainError, Embed, Message, Snowflake};
use ripcord_rest::{endpoints, Attachment, Method, RestError};
use serde_json::json;

/// Full set of knobs for sending a message; the convenience methods on
/// [`Cluster`] cover the common single-field cases
#[derive(Debug, Default)]
pub struct CreateMessage {
    pub content: String,
    pub embed: Option<Embed>,
    pub files: Vec<Attachment>,
}

impl CreateMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn file(mut self, file: Attachment) -> Self {
        self.files.push(file);
        self
    }
}

impl Cluster {
    /// Send a plain text message
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        content: impl Into<String>,
    ) -> ClusterResult<Message> {
        self.create_message_complex(channel_id, CreateMessage::new().content(content))
            .await
    }

    /// Send a message carrying only an embed
    pub async fn create_message_embed(
        &self,
        channel_id: Snowflake,
        embed: Embed,
    ) -> ClusterResult<Message> {
        self.create_message_complex(channel_id, CreateMessage::new().embed(embed))
            .await
    }

    /// Send a message carrying file attachments
    pub async fn create_message_files(
        &self,
        channel_id: Snowflake,
        files: Vec<Attachment>,
    ) -> ClusterResult<Message> {
        self.create_message_complex(channel_id, CreateMessage { files, ..CreateMessage::new() })
            .await
    }

    pub async fn create_message_complex(
        &self,
        channel_id: Snowflake,
        message: CreateMessage,
    ) -> ClusterResult<Message> {
        let body = json!({
            "content": message.content,
            "embed": message.embed,
        });
        let created = self
            .rest()
            .perform(
                Method::POST,
                &endpoints::channel_messages(channel_id),
                Some(body),
                &message.files,
            )
            .await?;
        Ok(created)
    }

    /// Replace a message's content
    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: impl Into<String>,
    ) -> ClusterResult<Message> {
        let body = json!({ "content": content.into() });
        let edited = self
            .rest()
            .perform(
                Method::PATCH,
                &endpoints::channel_message(channel_id, message_id),
                Some(body),
                &[],
            )
            .await?;
        Ok(edited)
    }

    pub async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> ClusterResult<()> {
        self.rest()
            .request(
                Method::DELETE,
                &endpoints::channel_message(channel_id, message_id),
                None,
                &[],
            )
            .await?;
        Ok(())
    }

    /// Delete the latest `count` messages in one call.
    ///
    /// Counts outside `[2, 100]` are rejected locally; no request is
    /// issued.
    pub async fn bulk_delete_messages(
        &self,
        channel_id: Snowflake,
        count: usize,
    ) -> ClusterResult<()> {
        if !(2..=100).contains(&count) {
            return Err(
                RestError::Configuration(DomainError::BulkDeleteRange(count).to_string()).into(),
            );
        }
        let body = json!({ "messages": count });
        self.rest()
            .request(
                Method::POST,
                &endpoints::channel_bulk_delete(channel_id),
                Some(body),
                &[],
            )
            .await?;
        Ok(())
    }

    /// React to a message as the current user
    pub async fn create_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> ClusterResult<()> {
        self.rest()
            .request(
                Method::PUT,
                &endpoints::channel_message_reaction(channel_id, message_id, emoji, "@me"),
                None,
                &[],
            )
            .await?;
        Ok(())
    }

    /// Remove another user's reaction
    pub async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
        user_id: Snowflake,
    ) -> ClusterResult<()> {
        self.rest()
            .request(
                Method::DELETE,
                &endpoints::channel_message_reaction(
                    channel_id,
                    message_id,
                    emoji,
                    &user_id.to_string(),
                ),
                None,
                &[],
            )
            .await?;
        Ok(())
    }

    /// Remove the current user's own reaction
    pub async fn remove_own_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> ClusterResult<()> {
        self.rest()
            .request(
                Method::DELETE,
                &endpoints::channel_message_reaction(channel_id, message_id, emoji, "@me"),
                None,
                &[],
            )
            .await?;
        Ok(())
    }

    /// Clear every reaction from a message
    pub async fn remove_all_reactions(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> ClusterResult<()> {
        self.rest()
            .request(
                Method::DELETE,
                &endpoints::channel_message_reactions_all(channel_id, message_id),
                None,
                &[],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClusterError;
    use crate::options::ClusterOptions;

    async fn offline_cluster() -> Cluster {
        Cluster::new(
            "token",
            ClusterOptions::new()
                .total_shards(1)
                .gateway_url("ws://127.0.0.1:9")
                .rest_base_url("http://127.0.0.1:9"),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_bulk_delete_range_rejected_before_any_request() {
        let cluster = offline_cluster().await;
        let channel = Snowflake::new(1);

        for count in [0, 1, 101] {
            match cluster.bulk_delete_messages(channel, count).await {
                Err(ClusterError::Rest(RestError::Configuration(_))) => {}
                other => panic!("count {count} should be rejected locally, got {other:?}"),
            }
        }
        // no bucket was ever created, so no request went out
        assert_eq!(cluster.rest().bucket_count(), 0);
    }

    #[test]
    fn test_create_message_builder() {
        let message = CreateMessage::new()
            .content("hello")
            .embed(Embed::new().title("greetings"));
        assert_eq!(message.content, "hello");
        assert!(message.embed.is_some());
        assert!(message.files.is_empty());
    }
}
