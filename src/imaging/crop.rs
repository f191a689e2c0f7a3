//! Crop stage: turn the confirmed selection into a sub-bitmap.

use super::calculations::{centered_crop, constrain_crop};
use crate::types::{AspectRatio, CropRect, CropSelection, Stage};
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

pub const UNCONFIRMED_CROP_PROMPT: &str = "Please complete the cropping step.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("crop selection {rect} leaves nothing of a {width}x{height} image")]
    Empty { rect: CropRect, width: u32, height: u32 },
}

/// Resolve a selection against the image bounds and aspect lock.
pub fn resolve(
    selection: CropSelection,
    dimensions: (u32, u32),
    aspect: AspectRatio,
) -> Result<CropRect, CropError> {
    match selection {
        CropSelection::Auto => Ok(centered_crop(dimensions, aspect.ratio())),
        CropSelection::Rect(rect) => {
            constrain_crop(rect, dimensions, aspect.ratio()).ok_or(CropError::Empty {
                rect,
                width: dimensions.0,
                height: dimensions.1,
            })
        }
    }
}

/// Second pipeline stage. Returns the cropped bitmap and the rectangle
/// actually applied.
pub fn crop(
    image: &DynamicImage,
    selection: Option<CropSelection>,
    aspect: AspectRatio,
) -> Result<Stage<(DynamicImage, CropRect)>, CropError> {
    let Some(selection) = selection else {
        return Ok(Stage::AwaitingInput(UNCONFIRMED_CROP_PROMPT));
    };
    let rect = resolve(selection, image.dimensions(), aspect)?;
    let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
    Ok(Stage::Ready((cropped, rect)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{checker_rgba, gradient_rgb};

    #[test]
    fn no_selection_awaits_confirmation() {
        let img = gradient_rgb(100, 100);
        let stage = crop(&img, None, AspectRatio::Square).unwrap();
        assert!(matches!(stage, Stage::AwaitingInput(UNCONFIRMED_CROP_PROMPT)));
    }

    #[test]
    fn auto_square_on_landscape_is_centered() {
        let img = gradient_rgb(300, 100);
        let Stage::Ready((cropped, rect)) =
            crop(&img, Some(CropSelection::Auto), AspectRatio::Square).unwrap()
        else {
            panic!("expected a crop");
        };
        assert_eq!(cropped.dimensions(), (100, 100));
        assert_eq!((rect.x, rect.y), (100, 0));
    }

    #[test]
    fn explicit_rect_preserves_pixels() {
        let img = gradient_rgb(200, 200);
        let rect = CropRect {
            x: 50,
            y: 60,
            width: 40,
            height: 30,
        };
        let Stage::Ready((cropped, applied)) =
            crop(&img, Some(CropSelection::Rect(rect)), AspectRatio::Free).unwrap()
        else {
            panic!("expected a crop");
        };
        assert_eq!(applied, rect);
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(50, 60));
        assert_eq!(cropped.get_pixel(39, 29), img.get_pixel(89, 89));
    }

    #[test]
    fn aspect_lock_shrinks_explicit_rect() {
        let img = gradient_rgb(1000, 1000);
        let rect = CropRect {
            x: 0,
            y: 0,
            width: 800,
            height: 800,
        };
        let Stage::Ready((cropped, _)) =
            crop(&img, Some(CropSelection::Rect(rect)), AspectRatio::Wide).unwrap()
        else {
            panic!("expected a crop");
        };
        assert_eq!(cropped.dimensions(), (800, 450));
    }

    #[test]
    fn crop_keeps_alpha_channel() {
        let img = checker_rgba(20, 20);
        let Stage::Ready((cropped, _)) =
            crop(&img, Some(CropSelection::Auto), AspectRatio::Free).unwrap()
        else {
            panic!("expected a crop");
        };
        assert!(cropped.color().has_alpha());
    }

    #[test]
    fn selection_outside_image_errors() {
        let img = gradient_rgb(50, 50);
        let rect = CropRect {
            x: 60,
            y: 0,
            width: 10,
            height: 10,
        };
        let err = crop(&img, Some(CropSelection::Rect(rect)), AspectRatio::Free).unwrap_err();
        assert!(matches!(err, CropError::Empty { width: 50, .. }));
    }
}
