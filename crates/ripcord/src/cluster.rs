//! Cluster orchestration
//!
//! The cluster owns every shard and rate limiter; shards know the
//! cluster only as the far end of an event channel.

use crate::bus::EventBus;
use crate::error::{ClusterError, ClusterResult};
use crate::options::ClusterOptions;
use ripcord_gateway::{Event, EventKind, Shard, ShardConfig, ShardId};
use ripcord_rest::{endpoints, Method, RestError, RestManager};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};

/// Response of `GET /gateway/bot`
#[derive(Debug, Deserialize)]
struct GatewayBot {
    url: String,
    shards: u32,
}

struct ShardEntry {
    shard: Arc<Shard>,
    rest: Arc<RestManager>,
}

/// A group of shards sharing one token, one event bus, and one REST
/// pipeline.
///
/// Shard count resolution: an explicit id list wins, then an explicit
/// total, then the server-recommended count fetched once at
/// construction.
pub struct Cluster {
    gateway_url: String,
    total_shards: u32,
    rest: Arc<RestManager>,
    bus: Arc<EventBus>,
    shards: Vec<ShardEntry>,
    events_rx: parking_lot::Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Cluster {
    /// Build a cluster. Fetches `GET /gateway/bot` when either the
    /// gateway URL or the shard count is not given explicitly.
    pub async fn new(token: impl Into<String>, options: ClusterOptions) -> ClusterResult<Self> {
        let token = token.into();
        let rest = Arc::new(Self::build_rest(&token, &options));

        let needs_fetch = options.gateway_url.is_none()
            || (options.shards.is_empty() && options.total_shards.is_none());
        let fetched: Option<GatewayBot> = if needs_fetch {
            let info: GatewayBot = rest
                .perform(Method::GET, endpoints::GATEWAY_BOT, None, &[])
                .await?;
            tracing::debug!(
                recommended_shards = info.shards,
                gateway_url = %info.url,
                "Fetched gateway connection info"
            );
            Some(info)
        } else {
            None
        };

        let gateway_url = match options.gateway_url.clone() {
            Some(url) => url,
            None => fetched
                .as_ref()
                .map(|info| info.url.clone())
                .ok_or_else(|| RestError::Configuration("no gateway URL available".to_string()))?,
        };

        let (shard_ids, total_shards) = if options.shards.is_empty() {
            let total = options
                .total_shards
                .or_else(|| fetched.as_ref().map(|info| info.shards))
                .filter(|total| *total > 0)
                .ok_or_else(|| RestError::Configuration("shard count unresolved".to_string()))?;
            ((0..total).collect::<Vec<_>>(), total)
        } else {
            let ids = options.shards.clone();
            let total = options.total_shards.unwrap_or(ids.len() as u32);
            (ids, total)
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut shards = Vec::with_capacity(shard_ids.len());
        for id in shard_ids {
            let config = ShardConfig {
                token: token.clone(),
                gateway_url: gateway_url.clone(),
                shard_id: ShardId(id),
                total_shards,
                presence: options.presence.clone(),
                large_threshold: options.large_threshold,
                properties: options.properties.clone(),
            };
            shards.push(ShardEntry {
                shard: Shard::new(config, events_tx.clone()),
                rest: Arc::new(Self::build_rest(&token, &options)),
            });
        }

        tracing::info!(shards = shards.len(), total_shards, "Cluster constructed");
        Ok(Self {
            gateway_url,
            total_shards,
            rest,
            bus: Arc::new(EventBus::new()),
            shards,
            events_rx: parking_lot::Mutex::new(Some(events_rx)),
            pump: Mutex::new(None),
        })
    }

    fn build_rest(token: &str, options: &ClusterOptions) -> RestManager {
        match &options.rest_base_url {
            Some(base) => RestManager::with_base_url(token, base),
            None => RestManager::new(token),
        }
    }

    /// Gateway URL the shards connect to
    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    /// Total shard count identified to the server
    pub fn total_shards(&self) -> u32 {
        self.total_shards
    }

    /// Number of shards this cluster runs
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Look up a shard by id
    pub fn shard(&self, id: ShardId) -> Option<&Arc<Shard>> {
        self.shards
            .iter()
            .find(|entry| entry.shard.id() == id)
            .map(|entry| &entry.shard)
    }

    /// The rate limiter dedicated to one shard
    pub fn shard_rest(&self, id: ShardId) -> Option<&Arc<RestManager>> {
        self.shards
            .iter()
            .find(|entry| entry.shard.id() == id)
            .map(|entry| &entry.rest)
    }

    /// The cluster-wide rate limiter used by the resource helpers
    pub fn rest(&self) -> &Arc<RestManager> {
        &self.rest
    }

    /// The event bus shards publish into
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Subscribe a handler to one event kind
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.bus.on(kind, handler);
    }

    /// Total cached guild count across every shard
    pub fn guilds(&self) -> usize {
        self.shards
            .iter()
            .map(|entry| entry.shard.guild_count())
            .sum()
    }

    /// Run every shard concurrently until all of them stop.
    ///
    /// Failures do not abort sibling shards; every shard runs to its own
    /// end and the errors come back aggregated in
    /// [`ClusterError::Spawn`].
    pub async fn spawn(&self) -> ClusterResult<()> {
        if let Some(mut events_rx) = self.events_rx.lock().take() {
            let bus = Arc::clone(&self.bus);
            let handle = tokio::spawn(async move {
                while let Some(event) = events_rx.recv().await {
                    bus.emit(&event);
                }
            });
            *self.pump.lock().await = Some(handle);
        }

        let mut set = JoinSet::new();
        for entry in &self.shards {
            let shard = Arc::clone(&entry.shard);
            set.spawn(async move {
                let id = shard.id();
                (id, shard.run().await)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((id, Ok(()))) => {
                    tracing::info!(shard_id = %id, "Shard finished cleanly");
                }
                Ok((id, Err(err))) => {
                    tracing::warn!(shard_id = %id, error = %err, "Shard failed");
                    failures.push((id, err));
                }
                Err(err) => {
                    tracing::error!(error = %err, "Shard task aborted");
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ClusterError::Spawn(failures))
        }
    }

    /// Shut every shard down; a concurrent [`Cluster::spawn`] call then
    /// returns once the run tasks unwind
    pub async fn close(&self) {
        for entry in &self.shards {
            entry.shard.close().await;
        }
        if let Some(handle) = self.pump.lock().await.take() {
            handle.abort();
        }
        tracing::info!(shards = self.shards.len(), "Cluster closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripcord_gateway::SessionState;

    fn offline_options() -> ClusterOptions {
        // pointing at localhost keeps construction from fetching
        // anything and makes connects fail fast
        ClusterOptions::new()
            .gateway_url("ws://127.0.0.1:9")
            .rest_base_url("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_explicit_total_runs_contiguous_ids() {
        let cluster = Cluster::new("token", offline_options().total_shards(3))
            .await
            .unwrap();

        assert_eq!(cluster.shard_count(), 3);
        assert_eq!(cluster.total_shards(), 3);
        for id in 0..3 {
            assert!(cluster.shard(ShardId(id)).is_some());
        }
    }

    #[tokio::test]
    async fn test_explicit_id_list_wins_over_total() {
        let cluster = Cluster::new("token", offline_options().shards(vec![0, 2]).total_shards(4))
            .await
            .unwrap();

        assert_eq!(cluster.shard_count(), 2);
        assert_eq!(cluster.total_shards(), 4);
        assert!(cluster.shard(ShardId(2)).is_some());
        assert!(cluster.shard(ShardId(1)).is_none());
    }

    #[tokio::test]
    async fn test_id_list_without_total_defaults_to_list_length() {
        let cluster = Cluster::new("token", offline_options().shards(vec![0, 1]))
            .await
            .unwrap();
        assert_eq!(cluster.total_shards(), 2);
    }

    #[tokio::test]
    async fn test_each_shard_gets_its_own_rate_limiter() {
        let cluster = Cluster::new("token", offline_options().total_shards(2))
            .await
            .unwrap();

        let a = cluster.shard_rest(ShardId(0)).unwrap();
        let b = cluster.shard_rest(ShardId(1)).unwrap();
        assert!(!Arc::ptr_eq(a, b));
    }

    #[tokio::test]
    async fn test_spawn_aggregates_failures_without_aborting_siblings() {
        let cluster = Cluster::new("token", offline_options().total_shards(2))
            .await
            .unwrap();

        match cluster.spawn().await {
            Err(ClusterError::Spawn(failures)) => {
                // every shard reported its own connect failure
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected aggregate spawn failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_disconnects_every_shard() {
        let cluster = Cluster::new("token", offline_options().total_shards(2))
            .await
            .unwrap();

        cluster.close().await;
        for id in 0..2 {
            assert_eq!(
                cluster.shard(ShardId(id)).unwrap().state(),
                SessionState::Disconnected
            );
        }
    }

    #[tokio::test]
    async fn test_guilds_starts_at_zero() {
        let cluster = Cluster::new("token", offline_options().total_shards(1))
            .await
            .unwrap();
        assert_eq!(cluster.guilds(), 0);
    }
}
