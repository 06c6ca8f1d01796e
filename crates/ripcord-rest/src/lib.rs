//! # ripcord-rest
//!
//! Rate-limited outbound dispatch. Every REST call flows through a
//! [`RestManager`], which resolves the call's rate-limit bucket from its
//! normalized route and serializes requests per bucket while honoring the
//! account-wide global throttle.

mod attachment;
mod bucket;
pub mod endpoints;
mod error;
mod manager;
mod routes;

pub use attachment::Attachment;
pub use bucket::Bucket;
pub use error::RestError;
pub use manager::{GlobalThrottle, RestManager, API_BASE_URL};
pub use reqwest::Method;
pub use routes::normalize_route;
