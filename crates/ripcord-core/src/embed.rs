//! Rich embed builder
//!
//! Fluent builder for the embed objects attached to messages. The server
//! rejects over-long fields, so the setters clamp to the documented limits
//! instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embed title limit imposed by the server
const TITLE_LIMIT: usize = 256;
/// Embed description limit imposed by the server
const DESCRIPTION_LIMIT: usize = 2048;

fn named_colors() -> &'static HashMap<&'static str, u32> {
    static COLORS: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    COLORS.get_or_init(|| {
        HashMap::from([
            ("default", 0x000000),
            ("white", 0xFF_FFFF),
            ("aqua", 0x1A_BC9C),
            ("green", 0x2E_CC71),
            ("blue", 0x34_98DB),
            ("purple", 0x9B_59B6),
            ("gold", 0xF1_C40F),
            ("orange", 0xE6_7E22),
            ("red", 0xE7_4C3C),
            ("grey", 0x95_A5A6),
            ("navy", 0x34_495E),
            ("blurple", 0x72_89DA),
            ("greyple", 0x99_AAB5),
        ])
    })
}

/// A rich embed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub timestamp: String,
    #[serde(default)]
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub icon_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub icon_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl Embed {
    /// Create an empty rich embed
    pub fn new() -> Self {
        Self {
            kind: "rich".to_string(),
            ..Self::default()
        }
    }

    /// Set the title (clamped to 256 characters)
    pub fn title(mut self, title: impl Into<String>) -> Self {
        let mut title = title.into();
        truncate_chars(&mut title, TITLE_LIMIT);
        self.title = title;
        self
    }

    /// Set the description (clamped to 2048 characters)
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let mut description = description.into();
        truncate_chars(&mut description, DESCRIPTION_LIMIT);
        self.description = description;
        self
    }

    /// Set the accent color from a raw RGB integer
    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Set the accent color from a name ("blue") or hex string ("#3498DB").
    ///
    /// Unknown names leave the color untouched.
    pub fn color_named(mut self, name: &str) -> Self {
        if let Some(color) = named_colors().get(name) {
            self.color = *color;
        } else if let Ok(color) = u32::from_str_radix(name.trim_start_matches('#'), 16) {
            self.color = color;
        }
        self
    }

    /// Set the author line
    pub fn author(mut self, name: impl Into<String>, icon_url: impl Into<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            url: String::new(),
            icon_url: icon_url.into(),
        });
        self
    }

    /// Set the footer line
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url: String::new(),
        });
        self
    }

    /// Set the main image
    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(EmbedImage { url: url.into() });
        self
    }

    /// Set the thumbnail image
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(EmbedThumbnail { url: url.into() });
        self
    }

    /// Append a field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

fn truncate_chars(s: &mut String, limit: usize) {
    if let Some((index, _)) = s.char_indices().nth(limit) {
        s.truncate(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let embed = Embed::new()
            .title("ripcord")
            .color_named("blue")
            .description("A realtime client runtime.")
            .field("latency", "42ms", true);

        assert_eq!(embed.kind, "rich");
        assert_eq!(embed.color, 0x34_98DB);
        assert_eq!(embed.fields.len(), 1);
    }

    #[test]
    fn test_title_clamped() {
        let embed = Embed::new().title("x".repeat(400));
        assert_eq!(embed.title.chars().count(), 256);
    }

    #[test]
    fn test_hex_color() {
        let embed = Embed::new().color_named("#FF0000");
        assert_eq!(embed.color, 0xFF_0000);
    }

    #[test]
    fn test_empty_fields_skipped_on_wire() {
        let json = serde_json::to_value(Embed::new().title("t")).unwrap();
        assert!(json.get("footer").is_none());
        assert!(json.get("fields").is_none());
        assert_eq!(json["type"], "rich");
    }
}
