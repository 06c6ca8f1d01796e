//! Cluster configuration

use ripcord_core::Presence;
use ripcord_gateway::protocol::IdentifyProperties;
use serde::Deserialize;

const DEFAULT_LARGE_THRESHOLD: u32 = 250;

/// Options used when constructing a [`Cluster`](crate::Cluster).
///
/// Everything is optional; an empty `ClusterOptions` means "ask the
/// server how many shards to run and where the gateway lives".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Explicit shard ids to run; wins over `total_shards`
    pub shards: Vec<u32>,
    /// Total shard count; `None` falls back to the server-recommended
    /// count fetched at construction
    pub total_shards: Option<u32>,
    /// Presence sent with every identify
    pub presence: Presence,
    /// Member count above which a guild is considered large
    pub large_threshold: u32,
    /// Gateway URL override; `None` uses the one the server reports
    pub gateway_url: Option<String>,
    /// REST base URL override, mainly for tests
    pub rest_base_url: Option<String>,
    /// Client metadata sent with every identify
    pub properties: IdentifyProperties,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            shards: Vec::new(),
            total_shards: None,
            presence: Presence::default(),
            large_threshold: DEFAULT_LARGE_THRESHOLD,
            gateway_url: None,
            rest_base_url: None,
            properties: IdentifyProperties::default(),
        }
    }
}

impl ClusterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run exactly these shard ids
    pub fn shards(mut self, shards: impl Into<Vec<u32>>) -> Self {
        self.shards = shards.into();
        self
    }

    pub fn total_shards(mut self, total: u32) -> Self {
        self.total_shards = Some(total);
        self
    }

    pub fn presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn large_threshold(mut self, threshold: u32) -> Self {
        self.large_threshold = threshold;
        self
    }

    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    pub fn rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = Some(url.into());
        self
    }

    pub fn properties(mut self, properties: IdentifyProperties) -> Self {
        self.properties = properties;
        self
    }
}
