//! One sticker run: source → crop → background → text → export.
//!
//! A run is driven by a single immutable [`RunParams`]. Each stage either
//! hands a new bitmap to the next one or stops the run: missing input
//! yields [`Stage::AwaitingInput`], anything else that goes wrong is a
//! [`PipelineError`]. Nothing is carried from one run to the next.
//!
//! ```text
//! RunParams ─▶ source ─▶ crop ─▶ background ─▶ text ─▶ [preview] ─▶ export
//!                │         │          │                               │
//!         AwaitingInput  AwaitingInput  Err (short-circuit)        Artifact
//! ```

use crate::imaging::background::SegmentError;
use crate::imaging::crop::{self, CropError};
use crate::imaging::source::{self, SourceError};
use crate::imaging::{
    Artifact, ExportError, ExportParams, Segmenter, StickerEncoder, TextFont, TextOutcome,
    TextStyle, export_sticker, overlay_text, remove_background,
};
use crate::types::{AspectRatio, CropRect, CropSelection, Stage};
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error("Failed to remove background: {0}")]
    BackgroundRemoval(#[from] SegmentError),
    #[error("Failed to write preview {path}: {source}")]
    Preview {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to create sticker: {0}")]
    Export(#[from] ExportError),
}

/// Everything one run needs, decided up front.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    /// Uploaded image; `None` until the user provides one.
    pub input: Option<PathBuf>,
    /// Confirmed crop; `None` until the user confirms one.
    pub crop: Option<CropSelection>,
    pub aspect: AspectRatio,
    pub remove_background: bool,
    pub text: TextStyle,
    /// Distance from the edge for top/bottom text.
    pub text_margin: u32,
    /// Where to write the sticker; `None` renders previews only.
    pub export_dir: Option<PathBuf>,
    pub export: ExportParams,
    /// PNG of the bitmap after crop and background removal.
    pub matte_preview: Option<PathBuf>,
    /// PNG of the final bitmap before resizing.
    pub preview: Option<PathBuf>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            input: None,
            crop: None,
            aspect: AspectRatio::default(),
            remove_background: true,
            text: TextStyle::none(),
            text_margin: 10,
            export_dir: None,
            export: ExportParams::default(),
            matte_preview: None,
            preview: None,
        }
    }
}

/// Progress reported by a run, in stage order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Loaded {
        width: u32,
        height: u32,
        has_alpha: bool,
    },
    Cropped {
        rect: CropRect,
        aspect: AspectRatio,
    },
    BackgroundRemoved,
    BackgroundKept,
    Text(TextOutcome),
    /// Custom placement is only previewed; the text was drawn centered.
    CustomPlacementPreview,
    PreviewWritten {
        path: PathBuf,
    },
    Exported(Artifact),
}

/// Result of a run that got past every input prompt.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Final composited bitmap before resizing.
    pub image: RgbaImage,
    pub events: Vec<PipelineEvent>,
    /// `None` when the run was not asked to export.
    pub artifact: Option<Artifact>,
}

/// The pipeline with its injected capabilities.
pub struct Pipeline<'a> {
    segmenter: &'a dyn Segmenter,
    encoder: &'a dyn StickerEncoder,
    font: FontSource,
}

/// Where the text stage gets its font from.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// Walk the fallback chain on each run that draws text.
    Chain {
        names: Vec<String>,
        dirs: Vec<PathBuf>,
    },
    /// Use this font as-is.
    Fixed(TextFont),
}

impl FontSource {
    fn resolve(&self) -> TextFont {
        match self {
            FontSource::Chain { names, dirs } => TextFont::resolve(names, dirs),
            FontSource::Fixed(font) => font.clone(),
        }
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        segmenter: &'a dyn Segmenter,
        encoder: &'a dyn StickerEncoder,
        font: FontSource,
    ) -> Self {
        Self {
            segmenter,
            encoder,
            font,
        }
    }

    /// Run every stage once.
    pub fn run(&self, params: &RunParams) -> Result<Stage<RunOutput>, PipelineError> {
        let mut events = Vec::new();

        let image = match source::load(params.input.as_deref())? {
            Stage::Ready(image) => image,
            Stage::AwaitingInput(prompt) => return Ok(Stage::AwaitingInput(prompt)),
        };
        events.push(PipelineEvent::Loaded {
            width: image.width(),
            height: image.height(),
            has_alpha: image.color().has_alpha(),
        });

        let (cropped, rect) = match crop::crop(&image, params.crop, params.aspect)? {
            Stage::Ready(ready) => ready,
            Stage::AwaitingInput(prompt) => return Ok(Stage::AwaitingInput(prompt)),
        };
        debug!("cropped to {rect}");
        events.push(PipelineEvent::Cropped {
            rect,
            aspect: params.aspect,
        });

        let matte = remove_background(&cropped, params.remove_background, self.segmenter)?;
        events.push(if params.remove_background {
            PipelineEvent::BackgroundRemoved
        } else {
            PipelineEvent::BackgroundKept
        });
        if let Some(path) = &params.matte_preview {
            write_preview(&matte, path)?;
            events.push(PipelineEvent::PreviewWritten { path: path.clone() });
        }

        let (composited, outcome) = if params.text.is_blank() {
            (matte, TextOutcome::Skipped)
        } else {
            let font = self.font.resolve();
            overlay_text(&matte, &params.text, &font, params.text_margin)
        };
        let custom = matches!(
            outcome,
            TextOutcome::Drawn {
                anchor: crate::types::Anchor::Custom,
                ..
            }
        );
        events.push(PipelineEvent::Text(outcome));
        if custom {
            events.push(PipelineEvent::CustomPlacementPreview);
        }
        if let Some(path) = &params.preview {
            write_preview(&composited, path)?;
            events.push(PipelineEvent::PreviewWritten { path: path.clone() });
        }

        let artifact = match &params.export_dir {
            Some(dir) => {
                let artifact = export_sticker(
                    self.encoder,
                    &DynamicImage::ImageRgba8(composited.clone()),
                    dir,
                    &params.export,
                )?;
                info!(
                    "exported {} at quality {} ({} bytes)",
                    artifact.file_name,
                    artifact.quality.value(),
                    artifact.bytes
                );
                events.push(PipelineEvent::Exported(artifact.clone()));
                Some(artifact)
            }
            None => None,
        };

        Ok(Stage::Ready(RunOutput {
            image: composited,
            events,
            artifact,
        }))
    }
}

fn write_preview(image: &RgbaImage, path: &Path) -> Result<(), PipelineError> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| PipelineError::Preview {
            path: path.to_path_buf(),
            source,
        })
}
