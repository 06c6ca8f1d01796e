//! File attachments

use reqwest::multipart::Part;

/// A file attached to an outbound message.
///
/// Attachments are buffered in memory; a request carrying them is sent as
/// multipart with one part per file plus a JSON control part.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create an attachment from raw bytes
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Build the multipart part for this attachment.
    ///
    /// A bad content type falls back to `application/octet-stream` rather
    /// than failing the whole request.
    pub(crate) fn to_part(&self) -> Part {
        let part = Part::bytes(self.bytes.clone()).file_name(self.name.clone());
        match part.mime_str(&self.content_type) {
            Ok(part) => part,
            Err(_) => Part::bytes(self.bytes.clone())
                .file_name(self.name.clone())
                .mime_str("application/octet-stream")
                .unwrap_or_else(|_| Part::bytes(self.bytes.clone()).file_name(self.name.clone())),
        }
    }
}
