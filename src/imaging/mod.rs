//! Image processing stages, in pipeline order.
//!
//! | Stage | Module | Crate / function |
//! |---|---|---|
//! | **Source** | [`source`] | `image::ImageReader` (PNG, JPEG, WebP) |
//! | **Crop** | [`crop`] | `DynamicImage::crop_imm` |
//! | **Background** | [`background`] | [`Segmenter`] capability, external matting command |
//! | **Text** | [`text`] | `ab_glyph` outlines, `font8x8` fallback |
//! | **Export** | [`export`] | Lanczos3 resize + [`WebpEncoder`] (libwebp) |
//!
//! Supporting pieces:
//! - **Calculations**: pure crop, anchor and quality-ladder math (unit testable)
//! - **Parameters**: [`Quality`] and [`ExportParams`]
//! - **Backend**: [`StickerEncoder`] trait + [`WebpEncoder`]

pub mod background;
pub mod backend;
pub mod calculations;
pub mod color;
pub mod crop;
pub mod export;
mod params;
pub mod source;
pub mod text;
pub mod webp_backend;

pub use background::{CommandSegmenter, SegmentError, Segmenter, remove_background};
pub use backend::{BackendError, StickerEncoder};
pub use export::{Artifact, EncodeAttempt, ExportError, export_sticker};
pub use params::{ExportParams, Quality};
pub use text::{TextFont, TextOutcome, TextStyle, overlay_text};
pub use webp_backend::WebpEncoder;
