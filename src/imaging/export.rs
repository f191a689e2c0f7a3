//! Export stage: square canvas, random name, quality ladder.
//!
//! Every attempt is written to the same path, so only the last encode
//! survives on disk. Missing the byte ceiling at the lowest quality is not
//! an error; the artifact reports `within_limit: false`.

use super::backend::{BackendError, StickerEncoder};
use super::calculations::quality_ladder;
use super::params::{ExportParams, Quality};
use crate::naming::{sticker_file_name, sticker_id};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, Rgba32FImage, RgbaImage};
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("no quality between {start} and {floor} to try")]
    EmptyLadder { start: u32, floor: u32 },
}

/// One encode-and-write of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeAttempt {
    pub quality: Quality,
    pub bytes: u64,
}

/// The file the export stage left on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub bytes: u64,
    pub max_bytes: u64,
    pub within_limit: bool,
    pub attempts: Vec<EncodeAttempt>,
}

/// Resize to the exact square canvas with Lanczos3.
///
/// The aspect ratio is not preserved; a 3000x1200 crop is squashed.
/// Resampling runs on premultiplied alpha, so the color left behind in
/// fully transparent pixels never bleeds into visible edges.
pub fn prepare_canvas(image: &RgbaImage, size: u32) -> RgbaImage {
    let premultiplied = premultiply(image);
    let resized = image::imageops::resize(&premultiplied, size, size, FilterType::Lanczos3);
    unpremultiply(&resized)
}

fn premultiply(image: &RgbaImage) -> Rgba32FImage {
    Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0.map(|c| c as f32 / 255.0);
        Rgba([r * a, g * a, b * a, a])
    })
}

/// Back to straight 8-bit RGBA. Pixels whose alpha rounds to 0 become
/// `(0, 0, 0, 0)`.
fn unpremultiply(image: &Rgba32FImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([channel(r), channel(g), channel(b), alpha])
    })
}

/// Fifth pipeline stage with a fresh random identifier.
pub fn export_sticker(
    encoder: &dyn StickerEncoder,
    image: &DynamicImage,
    out_dir: &Path,
    params: &ExportParams,
) -> Result<Artifact, ExportError> {
    export_sticker_with_id(encoder, image, out_dir, params, &sticker_id())
}

/// Export under a caller-chosen identifier.
pub fn export_sticker_with_id(
    encoder: &dyn StickerEncoder,
    image: &DynamicImage,
    out_dir: &Path,
    params: &ExportParams,
    id: &str,
) -> Result<Artifact, ExportError> {
    let ladder = quality_ladder(
        params.start_quality.value(),
        params.quality_step,
        params.min_quality.value(),
    );
    if ladder.is_empty() {
        return Err(ExportError::EmptyLadder {
            start: params.start_quality.value(),
            floor: params.min_quality.value(),
        });
    }

    let canvas = prepare_canvas(&image.to_rgba8(), params.size);
    let file_name = sticker_file_name(&params.name_prefix, id, encoder.extension());
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&file_name);

    let mut attempts: Vec<EncodeAttempt> = Vec::with_capacity(ladder.len());
    for quality in ladder.into_iter().map(Quality::new) {
        let encoded = encoder.encode(&canvas, quality)?;
        std::fs::write(&path, &encoded)?;
        let bytes = std::fs::metadata(&path)?.len();
        debug!("{file_name}: quality {} -> {bytes} bytes", quality.value());
        attempts.push(EncodeAttempt { quality, bytes });
        if bytes <= params.max_bytes {
            break;
        }
    }

    let Some(&last) = attempts.last() else {
        return Err(ExportError::EmptyLadder {
            start: params.start_quality.value(),
            floor: params.min_quality.value(),
        });
    };
    Ok(Artifact {
        file_name,
        path,
        width: canvas.width(),
        height: canvas.height(),
        quality: last.quality,
        bytes: last.bytes,
        max_bytes: params.max_bytes,
        within_limit: last.bytes <= params.max_bytes,
        attempts,
    })
}
