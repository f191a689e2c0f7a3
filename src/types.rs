//! Shared types passed between pipeline stages and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown aspect ratio '{0}' (expected 1:1, 16:9, 4:3, 2:3 or free)")]
    AspectRatio(String),
    #[error("invalid crop '{0}' (expected 'auto' or x,y,width,height)")]
    Crop(String),
}

/// Outcome of a stage that may need more input before it can proceed.
///
/// `AwaitingInput` is not a failure: the run halts and the prompt is shown
/// to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage<T> {
    Ready(T),
    AwaitingInput(&'static str),
}

impl<T> Stage<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stage<U> {
        match self {
            Stage::Ready(v) => Stage::Ready(f(v)),
            Stage::AwaitingInput(prompt) => Stage::AwaitingInput(prompt),
        }
    }
}

/// Aspect ratio lock for the crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "2:3")]
    Portrait,
    #[serde(rename = "free")]
    Free,
}

impl AspectRatio {
    /// The locked `(width, height)` ratio, or `None` when unconstrained.
    pub fn ratio(self) -> Option<(u32, u32)> {
        match self {
            AspectRatio::Square => Some((1, 1)),
            AspectRatio::Wide => Some((16, 9)),
            AspectRatio::Classic => Some((4, 3)),
            AspectRatio::Portrait => Some((2, 3)),
            AspectRatio::Free => None,
        }
    }
}

impl FromStr for AspectRatio {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Wide),
            "4:3" => Ok(AspectRatio::Classic),
            "2:3" => Ok(AspectRatio::Portrait),
            other if other.eq_ignore_ascii_case("free") => Ok(AspectRatio::Free),
            other => Err(ParseError::AspectRatio(other.to_string())),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio() {
            Some((w, h)) => write!(f, "{w}:{h}"),
            None => f.write_str("free"),
        }
    }
}

/// Rectangle in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// What the user confirmed in the crop step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropSelection {
    /// Largest centered box of the locked ratio (whole image when free).
    Auto,
    Rect(CropRect),
}

impl FromStr for CropSelection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(CropSelection::Auto);
        }
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| ParseError::Crop(s.to_string()))?;
        match parts.as_slice() {
            [x, y, width, height] => Ok(CropSelection::Rect(CropRect {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            })),
            _ => Err(ParseError::Crop(s.to_string())),
        }
    }
}

/// Named rule for positioning overlay text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Bottom,
    Top,
    Center,
    /// Previewed as a free placement but drawn centered.
    Custom,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Anchor::Bottom => "bottom",
            Anchor::Top => "top",
            Anchor::Center => "center",
            Anchor::Custom => "custom",
        })
    }
}
