//! Rate-limited REST dispatch
//!
//! [`RestManager`] is the single entry point for outbound calls. It owns
//! the bucket registry (lazily populated, never evicted, one bucket per
//! normalized route) and the account-wide global throttle every bucket
//! consults before sending.

use crate::attachment::Attachment;
use crate::bucket::Bucket;
use crate::error::{RestError, RestResult};
use crate::routes::normalize_route;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Base URL for all REST requests
pub const API_BASE_URL: &str = "https://discordapp.com/api/v6";

const USER_AGENT_VALUE: &str = "DiscordBot (https://github.com/seung/ripcord, 0.1)";

/// Account-wide throttle clock.
///
/// Stores the epoch-millisecond instant until which every bucket must
/// suspend; 0 means no global limit is active. A single atomic, read and
/// written by any bucket without coordination.
#[derive(Debug, Default)]
pub struct GlobalThrottle {
    reset_at_ms: AtomicI64,
}

impl GlobalThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the throttle until the given instant
    pub fn set_until(&self, until: DateTime<Utc>) {
        self.reset_at_ms
            .store(until.timestamp_millis(), Ordering::SeqCst);
    }

    /// The instant the throttle releases, if it is currently armed
    pub fn active_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let reset_ms = self.reset_at_ms.load(Ordering::SeqCst);
        if reset_ms <= now.timestamp_millis() {
            return None;
        }
        Utc.timestamp_millis_opt(reset_ms).single()
    }
}

/// Shared request machinery handed to buckets
pub(crate) struct RestContext {
    client: reqwest::Client,
    token: String,
    base_url: String,
    pub(crate) global: GlobalThrottle,
}

impl RestContext {
    /// Issue the HTTP request: JSON body, or multipart (one part per
    /// attachment plus a `payload_json` control part) when files are
    /// attached.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        files: &[Attachment],
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .header(USER_AGENT, USER_AGENT_VALUE);

        request = if files.is_empty() {
            match body {
                Some(body) => request.json(body),
                None => request,
            }
        } else {
            let mut form = Form::new();
            for (index, file) in files.iter().enumerate() {
                form = form.part(format!("file{index}"), file.to_part());
            }
            if let Some(body) = body {
                form = form.text("payload_json", body.to_string());
            }
            request.multipart(form)
        };

        request.send().await
    }
}

/// Owner of the bucket registry and the global throttle.
///
/// One manager serves one client/shard; buckets live for the process
/// lifetime.
pub struct RestManager {
    ctx: Arc<RestContext>,
    buckets: DashMap<String, Arc<Bucket>>,
}

impl RestManager {
    /// Manager against the production API
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE_URL)
    }

    /// Manager against a custom base URL (tests, proxies)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            ctx: Arc::new(RestContext {
                client: reqwest::Client::new(),
                token: token.into(),
                base_url: base_url.into(),
                global: GlobalThrottle::new(),
            }),
            buckets: DashMap::new(),
        }
    }

    /// The account-wide throttle consulted by every bucket
    pub fn global(&self) -> &GlobalThrottle {
        &self.ctx.global
    }

    /// The shared request machinery handed to each bucket
    pub(crate) fn context(&self) -> &RestContext {
        &self.ctx
    }

    /// Resolve (or lazily create) the bucket for a normalized route.
    ///
    /// Concurrent first use of a route races safely; the first creator
    /// wins and everyone gets the same bucket.
    pub fn bucket(&self, route: &str) -> Arc<Bucket> {
        self.buckets
            .entry(route.to_string())
            .or_insert_with(|| Arc::new(Bucket::new(route.to_string())))
            .clone()
    }

    /// Number of routes seen so far
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Send a raw request through the rate limiter, returning the body
    /// bytes
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        files: &[Attachment],
    ) -> RestResult<Bytes> {
        let route = normalize_route(&method, path);
        let bucket = self.bucket(&route);
        bucket
            .request(&self.ctx, method, path, body.as_ref(), files)
            .await
    }

    /// Send a request and decode the response into `T`.
    ///
    /// A body that does not match `T` surfaces as [`RestError::Decode`],
    /// distinct from transport and server failures.
    pub async fn perform<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        files: &[Attachment],
    ) -> RestResult<T> {
        let route = normalize_route(&method, path);
        let bytes = self.request(method, path, body, files).await?;
        serde_json::from_slice(&bytes).map_err(|source| RestError::Decode { route, source })
    }
}
