//! Decoder registry — extension-keyed dispatch for attachment decoding.

use chinwag_core::attachment::{Attachment, NormalizedContent, UploadedFile};
use chinwag_core::error::IngestError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Ingestion policy limits, owned by the registry so individual decoders
/// stay pure functions of their input.
#[derive(Debug, Clone)]
pub struct IngestPolicy {
    /// Per-file size ceiling in bytes
    pub max_bytes: u64,
    /// Maximum image dimension after downscaling
    pub max_image_dim: u32,
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            max_image_dim: 1024,
        }
    }
}

/// A decoder for one family of file extensions.
pub trait Decoder: Send + Sync {
    /// The lowercased extensions this decoder handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Decode raw bytes into normalized content. Must fail with a typed
    /// error; swallowing a failure into empty content is a defect.
    fn decode(&self, file: &UploadedFile) -> Result<NormalizedContent, IngestError>;
}

/// Registry mapping file extension → decoder strategy.
pub struct DecoderRegistry {
    decoders: HashMap<&'static str, Arc<dyn Decoder>>,
    policy: IngestPolicy,
}

impl DecoderRegistry {
    pub fn new(policy: IngestPolicy) -> Self {
        Self {
            decoders: HashMap::new(),
            policy,
        }
    }

    /// Register a decoder for all extensions it claims. Replaces any
    /// existing registration for the same extension.
    pub fn register(&mut self, decoder: Arc<dyn Decoder>) {
        for ext in decoder.extensions() {
            self.decoders.insert(*ext, decoder.clone());
        }
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<_> = self.decoders.keys().copied().collect();
        exts.sort_unstable();
        exts
    }

    pub fn policy(&self) -> &IngestPolicy {
        &self.policy
    }

    /// Normalize an upload: enforce the size ceiling and the extension
    /// allow-list, then hand off to the matching decoder.
    pub fn normalize(&self, file: &UploadedFile) -> Result<Attachment, IngestError> {
        if file.size_bytes() > self.policy.max_bytes {
            return Err(IngestError::TooLarge {
                name: file.name.clone(),
                size_bytes: file.size_bytes(),
                limit_bytes: self.policy.max_bytes,
            });
        }

        let extension = file.extension().ok_or_else(|| IngestError::UnsupportedType {
            name: file.name.clone(),
            extension: String::new(),
        })?;

        let decoder =
            self.decoders
                .get(extension.as_str())
                .ok_or_else(|| IngestError::UnsupportedType {
                    name: file.name.clone(),
                    extension: extension.clone(),
                })?;

        let content = decoder.decode(file)?;
        debug!(
            name = %file.name,
            size = file.size_bytes(),
            image = matches!(content, NormalizedContent::Image { .. }),
            "Normalized attachment"
        );

        Ok(Attachment {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
            size_bytes: file.size_bytes(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_registry;

    #[test]
    fn unknown_extension_rejected() {
        let registry = default_registry(IngestPolicy::default());
        let file = UploadedFile::new("binary.exe", "application/octet-stream", vec![0u8; 16]);
        let err = registry.normalize(&file).unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnsupportedType { ref extension, .. } if extension == "exe"
        ));
    }

    #[test]
    fn missing_extension_rejected() {
        let registry = default_registry(IngestPolicy::default());
        let file = UploadedFile::new("README", "text/plain", b"hello".to_vec());
        assert!(matches!(
            registry.normalize(&file).unwrap_err(),
            IngestError::UnsupportedType { .. }
        ));
    }

    #[test]
    fn size_ceiling_enforced_before_decoding() {
        let policy = IngestPolicy {
            max_bytes: 8,
            ..IngestPolicy::default()
        };
        let registry = default_registry(policy);
        // Nine bytes of garbage with a supported extension: the ceiling
        // must reject it regardless of content.
        let file = UploadedFile::new("note.txt", "text/plain", vec![0xFF; 9]);
        let err = registry.normalize(&file).unwrap_err();
        assert!(matches!(
            err,
            IngestError::TooLarge {
                size_bytes: 9,
                limit_bytes: 8,
                ..
            }
        ));
    }

    #[test]
    fn exactly_at_limit_is_allowed() {
        let policy = IngestPolicy {
            max_bytes: 5,
            ..IngestPolicy::default()
        };
        let registry = default_registry(policy);
        let file = UploadedFile::new("note.txt", "text/plain", b"hello".to_vec());
        assert!(registry.normalize(&file).is_ok());
    }

    #[test]
    fn default_registry_covers_the_allow_list() {
        let registry = default_registry(IngestPolicy::default());
        assert_eq!(
            registry.supported_extensions(),
            vec!["csv", "jpeg", "jpg", "json", "md", "pdf", "png", "py", "txt"]
        );
    }

    #[test]
    fn uppercase_extension_dispatches() {
        let registry = default_registry(IngestPolicy::default());
        let file = UploadedFile::new("NOTES.TXT", "text/plain", b"caps".to_vec());
        let attachment = registry.normalize(&file).unwrap();
        assert_eq!(
            attachment.content,
            NormalizedContent::Text("caps".into())
        );
    }
}
