//! Attachment value objects.
//!
//! An `UploadedFile` is the raw input handed to the normalizer; an
//! `Attachment` is the normalized result. Attachments are transient — only
//! the `Message` synthesized from them is ever persisted.

use serde::{Deserialize, Serialize};

/// A raw uploaded file, before normalization.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, including extension
    pub name: String,
    /// MIME type as reported by the uploader (advisory; the normalizer
    /// dispatches on extension)
    pub media_type: String,
    /// The raw bytes
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Normalized attachment content: UTF-8 text or a bounded base64 image.
/// The two are never conflated — an image payload is tagged as such all
/// the way to the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizedContent {
    /// Decoded/rendered text (plain, pretty-printed JSON, tabular, PDF pages)
    Text(String),
    /// Re-encoded image: base64 payload plus its MIME type
    Image { media_type: String, data: String },
}

/// An uploaded file after normalization.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub content: NormalizedContent,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        matches!(self.content, NormalizedContent::Image { .. })
    }
}
