//! Presence and activity types

use serde::{Deserialize, Serialize};

/// Online status reported in a presence update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Online,
    Idle,
    #[serde(rename = "dnd")]
    DoNotDisturb,
    Invisible,
}

/// Activity types shown under a presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ActivityType {
    #[default]
    Playing,
    Streaming,
    Listening,
    Watching,
}

impl From<ActivityType> for u8 {
    fn from(value: ActivityType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for ActivityType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Playing),
            1 => Ok(Self::Streaming),
            2 => Ok(Self::Listening),
            3 => Ok(Self::Watching),
            other => Err(format!("unknown activity type: {other}")),
        }
    }
}

/// The activity shown under a presence ("Playing <name>")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
}

/// Presence carried in the identify payload and in status updates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presence {
    #[serde(rename = "game")]
    pub activity: Activity,
    pub status: Status,
}

impl Presence {
    /// Presence showing "Playing <name>" while online
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            activity: Activity {
                name: name.into(),
                kind: ActivityType::Playing,
            },
            status: Status::Online,
        }
    }
}
