//! Text overlay stage.
//!
//! Fonts come from an ordered chain of file names, each looked up as a
//! path and then inside the configured font directories. The first file
//! that parses as a scalable font wins; when none does, text is drawn with
//! the built-in 8x8 bitmap font at its fixed size. Font problems are
//! logged, never reported.
//!
//! Text is rasterized into a coverage mask cropped to its ink box, so the
//! mask's dimensions are the measured text size used for anchoring.

use super::calculations::anchor_position;
use super::color::{ColorError, opacity_to_255, parse_hex_rgb};
use crate::types::Anchor;
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Cell size of the fallback bitmap font.
const BITMAP_CELL: u32 = 8;

/// Everything the user chose for the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub content: String,
    /// Pixel size for scalable fonts.
    pub size: u32,
    pub color: [u8; 3],
    /// 0-100.
    pub opacity: u8,
    pub anchor: Anchor,
}

impl TextStyle {
    pub fn new(
        content: impl Into<String>,
        size: u32,
        hex_color: &str,
        opacity: u8,
        anchor: Anchor,
    ) -> Result<Self, ColorError> {
        Ok(Self {
            content: content.into(),
            size,
            color: parse_hex_rgb(hex_color)?,
            opacity: opacity.min(100),
            anchor,
        })
    }

    /// A style with no text; the overlay stage passes the image through.
    pub fn none() -> Self {
        Self {
            content: String::new(),
            size: 40,
            color: [255, 255, 255],
            opacity: 100,
            anchor: Anchor::Bottom,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn fill(&self) -> Rgba<u8> {
        let [r, g, b] = self.color;
        Rgba([r, g, b, opacity_to_255(self.opacity)])
    }
}

/// The font text is drawn with.
#[derive(Clone)]
pub enum TextFont {
    Scalable { font: FontArc, path: PathBuf },
    /// Built-in fixed-size 8x8 glyphs.
    Bitmap,
}

impl std::fmt::Debug for TextFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextFont({})", self.describe())
    }
}

impl TextFont {
    /// Walk the fallback chain and return the first usable font.
    pub fn resolve(names: &[String], dirs: &[PathBuf]) -> Self {
        for name in names {
            for candidate in candidate_paths(name, dirs) {
                match load_scalable(&candidate) {
                    Some(font) => {
                        debug!("using font {}", candidate.display());
                        return TextFont::Scalable {
                            font,
                            path: candidate,
                        };
                    }
                    None => debug!("skipping unreadable font {}", candidate.display()),
                }
            }
            debug!("font {name} not found");
        }
        debug!("no scalable font available, falling back to bitmap font");
        TextFont::Bitmap
    }

    /// Human-readable name for reports.
    pub fn describe(&self) -> String {
        match self {
            TextFont::Scalable { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            TextFont::Bitmap => "built-in 8x8".to_string(),
        }
    }

    /// Rasterize `text` into a coverage mask cropped to its ink box.
    pub fn rasterize(&self, text: &str, size: u32) -> Coverage {
        match self {
            TextFont::Scalable { font, .. } => rasterize_scalable(font, text, size),
            TextFont::Bitmap => rasterize_bitmap(text),
        }
    }

    /// Measured `(width, height)` of `text`.
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        let mask = self.rasterize(text, size);
        (mask.width, mask.height)
    }
}

/// Direct path first, then case-insensitive file name matches under each
/// font directory.
fn candidate_paths<'a>(name: &'a str, dirs: &'a [PathBuf]) -> impl Iterator<Item = PathBuf> + 'a {
    let direct = Path::new(name);
    let direct = direct.is_file().then(|| direct.to_path_buf());

    let searched = dirs.iter().flat_map(move |dir| {
        WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(move |entry| {
                entry.file_type().is_file()
                    && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
            })
            .map(|entry| entry.into_path())
    });

    direct.into_iter().chain(searched)
}

fn load_scalable(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    FontArc::try_from_vec(data).ok()
}

/// Per-pixel glyph coverage in `0.0..=1.0`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Coverage {
    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    fn add(&mut self, x: i64, y: i64, value: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.data[idx] = (self.data[idx] + value).min(1.0);
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }
}

fn rasterize_scalable(font: &FontArc, text: &str, size: u32) -> Coverage {
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);

    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut outlines = Vec::new();
    for ch in text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        previous = Some(id);
        if let Some(outline) = font.outline_glyph(glyph) {
            outlines.push(outline);
        }
    }

    if outlines.is_empty() {
        return Coverage::empty();
    }

    let min_x = outlines.iter().map(|o| o.px_bounds().min.x).fold(f32::MAX, f32::min) as i64;
    let min_y = outlines.iter().map(|o| o.px_bounds().min.y).fold(f32::MAX, f32::min) as i64;
    let max_x = outlines.iter().map(|o| o.px_bounds().max.x).fold(f32::MIN, f32::max) as i64;
    let max_y = outlines.iter().map(|o| o.px_bounds().max.y).fold(f32::MIN, f32::max) as i64;

    let mut mask = Coverage::blank((max_x - min_x) as u32, (max_y - min_y) as u32);
    for outline in &outlines {
        let bounds = outline.px_bounds();
        let (left, top) = (bounds.min.x as i64 - min_x, bounds.min.y as i64 - min_y);
        outline.draw(|gx, gy, c| mask.add(left + gx as i64, top + gy as i64, c));
    }
    mask
}

fn rasterize_bitmap(text: &str) -> Coverage {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
    if chars.is_empty() {
        return Coverage::empty();
    }

    let mut mask = Coverage::blank(BITMAP_CELL * chars.len() as u32, BITMAP_CELL);
    for (i, ch) in chars.iter().enumerate() {
        let rows = BASIC_FONTS
            .get(*ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin = i as i64 * BITMAP_CELL as i64;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BITMAP_CELL {
                if (bits >> col) & 1 == 1 {
                    mask.add(origin + col as i64, row as i64, 1.0);
                }
            }
        }
    }
    mask
}

/// Source-over compositing of `fill` scaled by `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, fill: Rgba<u8>, coverage: f32) {
    let src_a = fill[3] as f32 / 255.0 * coverage;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    for c in 0..3 {
        let value = (fill[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Draw a coverage mask with its top-left corner at `position`, clipping
/// anything outside the image.
fn composite(image: &mut RgbaImage, mask: &Coverage, position: (i64, i64), fill: Rgba<u8>) {
    let (img_w, img_h) = (image.width() as i64, image.height() as i64);
    for my in 0..mask.height {
        let y = position.1 + my as i64;
        if y < 0 || y >= img_h {
            continue;
        }
        for mx in 0..mask.width {
            let x = position.0 + mx as i64;
            if x < 0 || x >= img_w {
                continue;
            }
            let coverage = mask.get(mx, my);
            if coverage > 0.0 {
                blend(image.get_pixel_mut(x as u32, y as u32), fill, coverage);
            }
        }
    }
}

/// What the overlay stage did.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOutcome {
    Skipped,
    Drawn {
        font: String,
        anchor: Anchor,
        position: (i64, i64),
        size: (u32, u32),
    },
}

/// Fourth pipeline stage. Blank text returns an identical copy.
pub fn overlay_text(
    image: &RgbaImage,
    style: &TextStyle,
    font: &TextFont,
    margin: u32,
) -> (RgbaImage, TextOutcome) {
    if style.is_blank() {
        return (image.clone(), TextOutcome::Skipped);
    }

    let mask = font.rasterize(&style.content, style.size);
    let position = anchor_position(
        image.dimensions(),
        (mask.width, mask.height),
        style.anchor,
        margin,
    );

    let mut result = image.clone();
    composite(&mut result, &mask, position, style.fill());
    (
        result,
        TextOutcome::Drawn {
            font: font.describe(),
            anchor: style.anchor,
            position,
            size: (mask.width, mask.height),
        },
    )
}
