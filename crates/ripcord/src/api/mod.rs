//! Resource helpers
//!
//! Thin typed wrappers over the REST pipeline, exposed as methods on
//! [`Cluster`](crate::Cluster). Each call rides the cluster's rate
//! limiter and surfaces decode failures distinctly from transport ones.

mod invites;
mod messages;
mod user;

pub use messages::CreateMessage;
