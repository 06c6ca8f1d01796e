//! Per-route rate-limit bucket
//!
//! One bucket exists per normalized route. The bucket serializes its
//! requests (single flight), suspends while the route or the whole account
//! is exhausted, refreshes its window from response headers, and recovers
//! from 429 and 5xx responses without surfacing them.

use crate::attachment::Attachment;
use crate::error::{RestError, RestResult};
use crate::manager::RestContext;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

/// Fixed backoff before the single 5xx retry
const SERVER_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Body of a 429 response
#[derive(Debug, Deserialize)]
struct RateLimitedBody {
    #[serde(default)]
    message: String,
    /// Delay until the next permitted request, milliseconds
    retry_after: i64,
    /// Whether the limit applies account-wide
    #[serde(default)]
    global: bool,
}

impl Default for RateLimitedBody {
    fn default() -> Self {
        Self {
            message: String::new(),
            retry_after: 1_000,
            global: false,
        }
    }
}

/// Rate-limit window for one route
#[derive(Debug, Clone)]
pub(crate) struct RateLimitState {
    pub(crate) remaining: i64,
    pub(crate) limit: i64,
    pub(crate) reset_at: Option<DateTime<Utc>>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        // one request is always allowed before the first headers arrive
        Self {
            remaining: 1,
            limit: 1,
            reset_at: None,
        }
    }
}

impl RateLimitState {
    /// The instant the next send becomes permissible, if the window is
    /// currently exhausted
    pub(crate) fn wait_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.remaining >= 1 {
            return None;
        }
        self.reset_at.filter(|reset| *reset > now)
    }

    /// Refresh the window from rate-limit response headers.
    ///
    /// The absolute reset instant is the server-reported epoch offset by
    /// the difference between our receive time and the server's `Date`
    /// header, cancelling clock skew. A missing or malformed `Date` falls
    /// back to the local clock.
    pub(crate) fn refresh(&mut self, headers: &HeaderMap, received_at: DateTime<Utc>) {
        if let Some(remaining) = header_i64(headers, "x-ratelimit-remaining") {
            self.remaining = remaining;
        }
        if let Some(limit) = header_i64(headers, "x-ratelimit-limit") {
            self.limit = limit;
        }

        let Some(reset_epoch) = header_i64(headers, "x-ratelimit-reset") else {
            return;
        };
        let server_now = headers
            .get(reqwest::header::DATE)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map_or(received_at, |t| t.with_timezone(&Utc));
        let skew = received_at - server_now;
        if let Some(reset) = Utc.timestamp_opt(reset_epoch, 0).single() {
            self.reset_at = Some(reset + skew);
        }
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// Rate-limit accounting unit for one normalized route.
///
/// The `tokio` mutex around the state doubles as the single-flight lock:
/// it is held across the entire request, so later callers queue in FIFO
/// submission order.
pub struct Bucket {
    route: String,
    state: Mutex<RateLimitState>,
}

impl Bucket {
    pub(crate) fn new(route: String) -> Self {
        Self {
            route,
            state: Mutex::new(RateLimitState::default()),
        }
    }

    /// The normalized route this bucket accounts for
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Send one request through this bucket.
    ///
    /// Holds the bucket for the call's duration. Never sends while the
    /// route window or the global throttle is exhausted; 429 responses are
    /// absorbed by re-waiting, 5xx is retried exactly once.
    pub(crate) async fn request(
        &self,
        ctx: &RestContext,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        files: &[Attachment],
    ) -> RestResult<Bytes> {
        let mut state = self.state.lock().await;
        let mut server_retried = false;

        loop {
            if let Some(until) = ctx.global.active_until(Utc::now()) {
                tracing::debug!(route = %self.route, until = %until, "Globally rate limited, suspending");
                sleep_until(until).await;
            }
            if let Some(until) = state.wait_until(Utc::now()) {
                tracing::debug!(route = %self.route, until = %until, "Bucket exhausted, suspending until reset");
                sleep_until(until).await;
            }

            let response = ctx.send(method.clone(), path, body, files).await?;
            let status = response.status();
            let received_at = Utc::now();
            state.refresh(response.headers(), received_at);

            if status == StatusCode::TOO_MANY_REQUESTS {
                let limited: RateLimitedBody = match response.bytes().await {
                    Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
                    Err(_) => RateLimitedBody::default(),
                };
                let reset = received_at + chrono::Duration::milliseconds(limited.retry_after.max(0));
                if limited.global {
                    tracing::warn!(route = %self.route, message = %limited.message, "Account-wide rate limit hit");
                    ctx.global.set_until(reset);
                } else {
                    tracing::debug!(route = %self.route, message = %limited.message, "Route rate limit hit");
                    state.remaining = 0;
                    state.reset_at = Some(reset);
                }
                continue;
            }

            if status.is_server_error() {
                if server_retried {
                    return Err(RestError::Server {
                        status: status.as_u16(),
                    });
                }
                tracing::warn!(route = %self.route, status = %status, "Server error, retrying once after backoff");
                server_retried = true;
                tokio::time::sleep(SERVER_ERROR_BACKOFF).await;
                continue;
            }

            if status.is_client_error() {
                let message = response.text().await.unwrap_or_default();
                return Err(RestError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.bytes().await?);
        }
    }
}

async fn sleep_until(when: DateTime<Utc>) {
    let wait = (when - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }
}
