//! Text-family decoders: plain UTF-8 files and JSON.

use crate::registry::Decoder;
use chinwag_core::attachment::{NormalizedContent, UploadedFile};
use chinwag_core::error::IngestError;

/// Decodes txt/md/py files as strict UTF-8. Invalid byte sequences are an
/// error, never replaced or dropped.
pub struct PlainTextDecoder;

impl Decoder for PlainTextDecoder {
    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "md", "py"]
    }

    fn decode(&self, file: &UploadedFile) -> Result<NormalizedContent, IngestError> {
        let text = String::from_utf8(file.bytes.clone()).map_err(|e| IngestError::Decode {
            name: file.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(NormalizedContent::Text(text))
    }
}

/// Validating pretty-printer for JSON files: parses, then re-serializes
/// with stable 2-space indentation so equivalent documents normalize to
/// identical text.
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn decode(&self, file: &UploadedFile) -> Result<NormalizedContent, IngestError> {
        let value: serde_json::Value =
            serde_json::from_slice(&file.bytes).map_err(|e| IngestError::Malformed {
                name: file.name.clone(),
                diagnostic: e.to_string(),
            })?;
        let pretty = serde_json::to_string_pretty(&value).map_err(|e| IngestError::Malformed {
            name: file.name.clone(),
            diagnostic: e.to_string(),
        })?;
        Ok(NormalizedContent::Text(pretty))
    }
}
