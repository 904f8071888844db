//! Image decoder: decode, bound dimensions, re-encode as JPEG, base64.

use crate::registry::Decoder;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chinwag_core::attachment::{NormalizedContent, UploadedFile};
use chinwag_core::error::IngestError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Fixed re-encode quality. Every image leaves the normalizer as JPEG at
/// this quality regardless of its input format.
const JPEG_QUALITY: u8 = 85;

/// Decodes png/jpg/jpeg uploads, converts to 3-channel RGB, downscales so
/// neither dimension exceeds `max_dim` (aspect ratio preserved; images
/// already inside the bound are left alone), then re-encodes to JPEG and
/// base64-encodes the result.
pub struct ImageDecoder {
    max_dim: u32,
}

impl ImageDecoder {
    pub fn new(max_dim: u32) -> Self {
        Self { max_dim }
    }

    /// Target dimensions under the bound: `scale = min(max/w, max/h)`,
    /// applied only when it shrinks. 2000x3000 with a 1024 bound becomes
    /// 683x1024.
    fn bounded_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
        let scale = f64::min(
            max_dim as f64 / width as f64,
            max_dim as f64 / height as f64,
        );
        if scale >= 1.0 {
            (width, height)
        } else {
            (
                ((width as f64 * scale).round() as u32).max(1),
                ((height as f64 * scale).round() as u32).max(1),
            )
        }
    }
}

impl Decoder for ImageDecoder {
    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg"]
    }

    fn decode(&self, file: &UploadedFile) -> Result<NormalizedContent, IngestError> {
        let decoded = image::load_from_memory(&file.bytes).map_err(|e| IngestError::Malformed {
            name: file.name.clone(),
            diagnostic: e.to_string(),
        })?;

        // Drop any alpha channel; JPEG output is always 3-channel RGB.
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        let (target_w, target_h) = Self::bounded_dimensions(width, height, self.max_dim);

        let rgb = if (target_w, target_h) != (width, height) {
            image::imageops::resize(&rgb, target_w, target_h, FilterType::Lanczos3)
        } else {
            rgb
        };

        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
        encoder
            .encode_image(&rgb)
            .map_err(|e| IngestError::Malformed {
                name: file.name.clone(),
                diagnostic: format!("JPEG re-encode failed: {e}"),
            })?;

        Ok(NormalizedContent::Image {
            media_type: "image/jpeg".into(),
            data: BASE64.encode(&buffer),
        })
    }
}
