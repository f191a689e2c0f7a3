//! Parameter types for the export stage.
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ExportParams`] — Canvas size, byte ceiling, quality ladder and file name prefix.

use serde::Serialize;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Everything the export stage needs besides the bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    /// Square canvas edge in pixels.
    pub size: u32,
    /// Byte ceiling for the encoded file.
    pub max_bytes: u64,
    pub start_quality: Quality,
    pub quality_step: u32,
    /// Lowest quality tried; the ladder never goes below it.
    pub min_quality: Quality,
    pub name_prefix: String,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            size: 512,
            max_bytes: 100 * 1024,
            start_quality: Quality::default(),
            quality_step: 10,
            min_quality: Quality::new(20),
            name_prefix: "xtickr_sticker".to_string(),
        }
    }
}
