//! Invite entity

use crate::entities::Guild;
use serde::{Deserialize, Serialize};

/// A guild invite, keyed by its short code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild: Option<Guild>,
    #[serde(default, rename = "approximate_presence_count")]
    pub presence_count: u64,
    #[serde(default, rename = "approximate_member_count")]
    pub member_count: u64,
}
