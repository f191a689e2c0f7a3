//! Shared test utilities: synthetic images, on-disk fixtures and a
//! scripted segmenter.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! write_test_jpeg(&path, 300, 200);
//!
//! let img = gradient_rgb(300, 200);
//! assert_opaque(&img.to_rgba8());
//! ```

use crate::imaging::background::{SegmentError, Segmenter};
use crate::imaging::text::TextFont;
use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::cell::Cell;
use std::path::{Path, PathBuf};

// =========================================================================
// Synthetic bitmaps
// =========================================================================

/// RGB gradient that exercises every channel.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

/// RGBA image with a checkerboard of half-transparent pixels.
pub fn checker_rgba(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if (x + y) % 2 == 0 { 255 } else { 100 };
        Rgba([(x % 256) as u8, 40, (y % 256) as u8, alpha])
    }))
}

/// Uniform RGBA canvas.
pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient_rgb(width, height).to_rgb8();
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid RGBA PNG with the given dimensions.
pub fn write_test_png_rgba(path: &Path, width: u32, height: u32) {
    let img = checker_rgba(width, height).to_rgba8();
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

/// Directory holding the bundled DejaVu Sans test font.
pub fn fixture_font_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts")
}

/// DejaVu Sans loaded through the regular font chain.
pub fn dejavu_sans() -> TextFont {
    let font = TextFont::resolve(&["DejaVuSans.ttf".to_string()], &[fixture_font_dir()]);
    assert!(
        matches!(font, TextFont::Scalable { .. }),
        "fixture font missing from {}",
        fixture_font_dir().display()
    );
    font
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert every pixel is fully opaque. Panics with the first offender.
pub fn assert_opaque(img: &RgbaImage) {
    if let Some((x, y, p)) = img.enumerate_pixels().find(|(_, _, p)| p[3] != 255) {
        panic!("pixel ({x}, {y}) is not opaque: {p:?}");
    }
}

// =========================================================================
// Scripted segmenter
// =========================================================================

/// Segmenter that clears the alpha of the left half, or fails on demand.
#[derive(Default)]
pub struct HalfMatteSegmenter {
    pub fail_with: Option<String>,
    pub calls: Cell<usize>,
}

impl HalfMatteSegmenter {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl Segmenter for HalfMatteSegmenter {
    fn segment(&self, image: &DynamicImage) -> Result<RgbaImage, SegmentError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(message) = &self.fail_with {
            return Err(SegmentError::Failed(message.clone()));
        }
        let mut out = image.to_rgba8();
        let half = out.width() / 2;
        for (x, _, pixel) in out.enumerate_pixels_mut() {
            if x < half {
                pixel[3] = 0;
            }
        }
        Ok(out)
    }
}
