//! Lossy WebP encoder backed by libwebp.
//!
//! The `image` crate only writes lossless WebP, which ignores quality and
//! cannot take part in the size ladder. The `webp` crate exposes libwebp's
//! full `WebPConfig`, so alpha is kept and the compression method can be
//! pushed to its slowest, smallest setting.

use super::backend::{BackendError, StickerEncoder};
use super::params::Quality;
use image::RgbaImage;

/// Slowest/best libwebp compression method.
pub const MAX_METHOD: i32 = 6;

/// Lossy WebP with alpha.
#[derive(Debug, Clone, Copy)]
pub struct WebpEncoder {
    method: i32,
}

impl WebpEncoder {
    pub fn new(method: i32) -> Self {
        Self {
            method: method.clamp(0, MAX_METHOD),
        }
    }
}

impl Default for WebpEncoder {
    fn default() -> Self {
        Self::new(MAX_METHOD)
    }
}

impl StickerEncoder for WebpEncoder {
    fn extension(&self) -> &'static str {
        "webp"
    }

    fn encode(&self, image: &RgbaImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut config = webp::WebPConfig::new()
            .map_err(|_| BackendError::EncodingFailed("libwebp config init failed".into()))?;
        config.lossless = 0;
        config.quality = quality.value() as f32;
        config.method = self.method;

        let encoder = webp::Encoder::from_rgba(image.as_raw(), image.width(), image.height());
        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| BackendError::EncodingFailed(format!("WebP encode failed: {e:?}")))?;
        Ok(encoded.to_vec())
    }
}
