//! Attachment normalization for Chinwag.
//!
//! Converts an uploaded file's raw bytes into either UTF-8 text or a
//! size-bounded base64 image payload, enforcing the type allow-list and
//! size ceiling. A pure transform: no network, no storage.
//!
//! Decoding is dispatched through a `DecoderRegistry` keyed by file
//! extension, so new formats register without touching existing decoders.

use std::sync::Arc;

pub mod document;
pub mod image;
pub mod registry;
pub mod tabular;
pub mod text;

pub use registry::{Decoder, DecoderRegistry, IngestPolicy};

/// Create a registry with all built-in decoders under the given policy.
///
/// Built-ins cover: txt/md/py (plain text), json (validating
/// pretty-printer), csv (tabular render), pdf (per-page text), png/jpg/jpeg
/// (bounded JPEG re-encode).
pub fn default_registry(policy: IngestPolicy) -> DecoderRegistry {
    let max_dim = policy.max_image_dim;
    let mut registry = DecoderRegistry::new(policy);
    registry.register(Arc::new(text::PlainTextDecoder));
    registry.register(Arc::new(text::JsonDecoder));
    registry.register(Arc::new(tabular::CsvDecoder));
    registry.register(Arc::new(document::PdfDecoder));
    registry.register(Arc::new(image::ImageDecoder::new(max_dim)));
    registry
}
