//! Shared helpers for cross-crate tests
//!
//! Everything here runs offline: the gateway and REST URLs point at a
//! local port nothing listens on, so construction never fetches and
//! connects fail fast.

use ripcord::{Cluster, ClusterOptions};

pub mod fixtures;

/// Options that keep a cluster from touching the network
pub fn offline_options() -> ClusterOptions {
    ClusterOptions::new()
        .gateway_url("ws://127.0.0.1:9")
        .rest_base_url("http://127.0.0.1:9")
}

/// A one-shard cluster built entirely offline
pub async fn offline_cluster() -> Cluster {
    Cluster::new("test-token", offline_options().total_shards(1))
        .await
        .expect("offline cluster construction should not fail")
}
