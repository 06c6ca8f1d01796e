//! Invite operations

use crate::cluster::Cluster;
use crate::error::ClusterResult;
use ripcord_core::Invite;
use ripcord_rest::{endpoints, Method};
use serde_json::json;

impl Cluster {
    /// Look up an invite by code, optionally with approximate presence
    /// and member counts
    pub async fn fetch_invite(&self, code: &str, with_counts: bool) -> ClusterResult<Invite> {
        let body = json!({ "with_counts": with_counts });
        let invite = self
            .rest()
            .perform(Method::GET, &endpoints::invite(code), Some(body), &[])
            .await?;
        Ok(invite)
    }

    /// Revoke an invite, returning the deleted invite
    pub async fn delete_invite(&self, code: &str) -> ClusterResult<Invite> {
        let invite = self
            .rest()
            .perform(Method::DELETE, &endpoints::invite(code), None, &[])
            .await?;
        Ok(invite)
    }
}
