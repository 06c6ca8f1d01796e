//! Wire entities
//!
//! Serde models for the objects the platform sends over the gateway and
//! the REST API. Most fields are optional on the wire; the models mirror
//! that rather than inventing stricter shapes.

mod guild;
mod invite;
mod message;
mod presence;
mod user;

pub use guild::Guild;
pub use invite::Invite;
pub use message::Message;
pub use presence::{Activity, ActivityType, Presence, Status};
pub use user::User;
