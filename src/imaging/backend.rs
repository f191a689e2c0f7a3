//! Sticker encoder trait and shared error type.
//!
//! The export stage only needs one operation from a codec: turn an RGBA
//! bitmap into bytes at a given lossy quality. The production
//! implementation is [`WebpEncoder`](super::webp_backend::WebpEncoder);
//! tests use a mock that scripts output sizes per quality.

use super::params::Quality;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Lossy encoder used by the export quality ladder.
pub trait StickerEncoder {
    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &'static str;

    /// Encode `image` at `quality`.
    fn encode(&self, image: &RgbaImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
