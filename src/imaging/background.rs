//! Background removal stage.
//!
//! Matting is an injected capability: anything implementing [`Segmenter`]
//! can isolate the foreground. The shipped [`CommandSegmenter`] hands the
//! bitmap to an external matting tool (by default the `rembg` CLI) through
//! scratch PNG files and reads the RGBA cutout back.
//!
//! With removal disabled the bitmap only gains an opaque alpha channel.

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("matting command is empty")]
    EmptyCommand,
    #[error("matting command `{program}` failed: {stderr}")]
    CommandFailed { program: String, stderr: String },
    #[error("matting returned {got:?}, expected {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        got: (u32, u32),
    },
    #[error("{0}")]
    Failed(String),
}

/// Foreground isolation: returns an RGBA bitmap of the same size with the
/// background alpha reduced or zeroed.
pub trait Segmenter {
    fn segment(&self, image: &DynamicImage) -> Result<RgbaImage, SegmentError>;
}

/// Runs an external matting command on scratch files.
///
/// `{input}` and `{output}` in the argument list are replaced by the paths
/// of the PNG written for the tool and the PNG it must produce.
#[derive(Debug, Clone)]
pub struct CommandSegmenter {
    command: Vec<String>,
}

impl CommandSegmenter {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// The argument vector after placeholder substitution.
    fn expand(&self, input: &str, output: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| arg.replace("{input}", input).replace("{output}", output))
            .collect()
    }
}

impl Default for CommandSegmenter {
    fn default() -> Self {
        Self::new(
            ["rembg", "i", "{input}", "{output}"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

impl Segmenter for CommandSegmenter {
    fn segment(&self, image: &DynamicImage) -> Result<RgbaImage, SegmentError> {
        let scratch = tempfile::TempDir::new()?;
        let input = scratch.path().join("input.png");
        let output = scratch.path().join("output.png");
        image.save_with_format(&input, ImageFormat::Png)?;

        let args = self.expand(&input.to_string_lossy(), &output.to_string_lossy());
        let (program, rest) = args.split_first().ok_or(SegmentError::EmptyCommand)?;
        debug!("running matting command: {}", args.join(" "));

        let result = Command::new(program).args(rest).output()?;
        if !result.status.success() {
            return Err(SegmentError::CommandFailed {
                program: program.clone(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(image::open(&output)?.to_rgba8())
    }
}

/// Third pipeline stage.
///
/// Segmentation failures propagate; callers must not run later stages on
/// a failed matte.
pub fn remove_background(
    image: &DynamicImage,
    enabled: bool,
    segmenter: &dyn Segmenter,
) -> Result<RgbaImage, SegmentError> {
    if !enabled {
        return Ok(image.to_rgba8());
    }

    let matte = segmenter.segment(image)?;
    let expected = (image.width(), image.height());
    if matte.dimensions() != expected {
        return Err(SegmentError::DimensionMismatch {
            expected,
            got: matte.dimensions(),
        });
    }
    Ok(matte)
}
