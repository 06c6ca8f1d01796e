//! Current-user operations

use crate::cluster::Cluster;
use crate::error::ClusterResult;
use ripcord_core::{Snowflake, User};
use ripcord_rest::{endpoints, Method};
use serde_json::json;

impl Cluster {
    /// Modify the current user's account. Empty fields are sent as-is;
    /// the server ignores them.
    pub async fn modify_user(&self, username: &str, avatar: &str) -> ClusterResult<User> {
        let body = json!({ "username": username, "avatar": avatar });
        let user = self
            .rest()
            .perform(Method::PATCH, &endpoints::user("@me"), Some(body), &[])
            .await?;
        Ok(user)
    }

    /// Change only the username
    pub async fn set_username(&self, username: &str) -> ClusterResult<User> {
        self.modify_user(username, "").await
    }

    /// Leave a guild as the current user
    pub async fn leave_guild(&self, guild_id: Snowflake) -> ClusterResult<()> {
        self.rest()
            .request(
                Method::DELETE,
                &endpoints::user_guild("@me", guild_id),
                None,
                &[],
            )
            .await?;
        Ok(())
    }
}
