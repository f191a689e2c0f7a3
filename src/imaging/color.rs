//! Fill color for overlay text: `#RRGGBB` plus an opacity percentage.

use image::Rgba;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color '{0}' (expected #RRGGBB)")]
    InvalidHex(String),
}

/// Map an opacity percentage to an 8-bit alpha, `round(255 * p / 100)`.
///
/// Percentages above 100 are treated as 100.
pub fn opacity_to_255(percent: u8) -> u8 {
    let p = percent.min(100) as f64;
    (255.0 * p / 100.0).round() as u8
}

/// Parse `#RRGGBB` (leading `#` optional, any case) into an RGB triple.
pub fn parse_hex_rgb(input: &str) -> Result<[u8; 3], ColorError> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ColorError::InvalidHex(input.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| ColorError::InvalidHex(input.to_string()))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Resolve the RGBA fill used to draw text.
pub fn fill_color(hex: &str, opacity_percent: u8) -> Result<Rgba<u8>, ColorError> {
    let [r, g, b] = parse_hex_rgb(hex)?;
    Ok(Rgba([r, g, b, opacity_to_255(opacity_percent)]))
}
