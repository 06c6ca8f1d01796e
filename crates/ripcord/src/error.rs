//! Cluster-level errors

use ripcord_gateway::{GatewayError, ShardId};
use ripcord_rest::RestError;

/// Failures surfaced by the cluster and its resource helpers
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error(transparent)]
    Rest(#[from] RestError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// One or more shards failed to run; siblings were not aborted
    #[error("{} shard(s) failed to run", .0.len())]
    Spawn(Vec<(ShardId, GatewayError)>),
}

pub type ClusterResult<T> = Result<T, ClusterError>;
