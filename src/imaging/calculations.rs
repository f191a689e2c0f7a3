//! Pure calculation functions for crop boxes, text anchors and the
//! export quality ladder.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::{Anchor, CropRect};

/// Largest `(width, height)` with the given aspect ratio that fits inside
/// `bounds`.
///
/// # Examples
/// ```
/// # use xtickr::imaging::calculations::fit_aspect;
/// // 16:9 inside a 1000x1000 square → full width, 562px tall
/// assert_eq!(fit_aspect((1000, 1000), (16, 9)), (1000, 562));
///
/// // 2:3 inside a wide 900x300 strip → 200x300
/// assert_eq!(fit_aspect((900, 300), (2, 3)), (200, 300));
/// ```
pub fn fit_aspect(bounds: (u32, u32), aspect: (u32, u32)) -> (u32, u32) {
    let (bw, bh) = (bounds.0 as u64, bounds.1 as u64);
    let (aw, ah) = (aspect.0 as u64, aspect.1 as u64);

    if bw * ah <= bh * aw {
        // Width-limited
        (bw as u32, (bw * ah / aw) as u32)
    } else {
        // Height-limited
        ((bh * aw / ah) as u32, bh as u32)
    }
}

/// The box the crop widget starts with: the largest centered box of the
/// locked ratio, or the whole image when unconstrained.
pub fn centered_crop(image: (u32, u32), aspect: Option<(u32, u32)>) -> CropRect {
    let (width, height) = match aspect {
        Some(aspect) => fit_aspect(image, aspect),
        None => image,
    };
    CropRect {
        x: (image.0 - width) / 2,
        y: (image.1 - height) / 2,
        width,
        height,
    }
}

/// Clamp a user rectangle to the image and apply the aspect lock.
///
/// The top-left corner is kept; the rectangle shrinks to the largest box
/// of the locked ratio that fits inside the clamped selection. Returns
/// `None` when nothing of the selection remains.
pub fn constrain_crop(
    rect: CropRect,
    image: (u32, u32),
    aspect: Option<(u32, u32)>,
) -> Option<CropRect> {
    let (img_w, img_h) = image;
    if rect.x >= img_w || rect.y >= img_h {
        return None;
    }

    let clamped = (
        rect.width.min(img_w - rect.x),
        rect.height.min(img_h - rect.y),
    );
    let (width, height) = match aspect {
        Some(aspect) => fit_aspect(clamped, aspect),
        None => clamped,
    };

    if width == 0 || height == 0 {
        return None;
    }
    Some(CropRect {
        x: rect.x,
        y: rect.y,
        width,
        height,
    })
}

/// Top-left draw position for a text box of `text` size on a `canvas`.
///
/// Uses floor division so text wider than the canvas gets a negative
/// offset and stays centered. `Custom` resolves to the center position.
pub fn anchor_position(
    canvas: (u32, u32),
    text: (u32, u32),
    anchor: Anchor,
    margin: u32,
) -> (i64, i64) {
    let (img_w, img_h) = (canvas.0 as i64, canvas.1 as i64);
    let (text_w, text_h) = (text.0 as i64, text.1 as i64);
    let margin = margin as i64;

    let x = (img_w - text_w).div_euclid(2);
    let y = match anchor {
        Anchor::Bottom => img_h - text_h - margin,
        Anchor::Top => margin,
        Anchor::Center | Anchor::Custom => (img_h - text_h).div_euclid(2),
    };
    (x, y)
}

/// Qualities to try, highest first: `start`, `start - step`, ... down to
/// and including `floor`. Never yields a value below `floor`.
///
/// # Examples
/// ```
/// # use xtickr::imaging::calculations::quality_ladder;
/// assert_eq!(quality_ladder(90, 10, 20), vec![90, 80, 70, 60, 50, 40, 30, 20]);
/// ```
pub fn quality_ladder(start: u32, step: u32, floor: u32) -> Vec<u32> {
    let mut ladder = Vec::new();
    if step == 0 {
        if start >= floor {
            ladder.push(start);
        }
        return ladder;
    }

    let mut quality = start;
    while quality >= floor {
        ladder.push(quality);
        match quality.checked_sub(step) {
            Some(next) => quality = next,
            None => break,
        }
    }
    ladder
}
