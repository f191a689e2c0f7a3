//! Image source: decode an uploaded file into an in-memory bitmap.
//!
//! The bitmap keeps whatever channel layout the file has (RGB or RGBA);
//! later stages decide when to force an alpha channel.

use crate::types::Stage;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

pub const MISSING_INPUT_PROMPT: &str = "Please upload an image to begin.";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
}

/// Extensions accepted as sticker sources.
const SOURCE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
];

/// Returns the source extensions that have a decoder compiled in.
pub fn supported_input_extensions() -> Vec<&'static str> {
    SOURCE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
}

/// Decode a file from disk.
pub fn open(path: &Path) -> Result<DynamicImage, SourceError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| SourceError::Decode {
            name: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Decode an in-memory upload, sniffing the format from its bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, SourceError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(|e| SourceError::Decode {
            name: "upload".to_string(),
            reason: e.to_string(),
        })
}

/// First pipeline stage: no path means the user has not uploaded yet.
pub fn load(input: Option<&Path>) -> Result<Stage<DynamicImage>, SourceError> {
    match input {
        Some(path) => open(path).map(Stage::Ready),
        None => Ok(Stage::AwaitingInput(MISSING_INPUT_PROMPT)),
    }
}
