//! Sticker configuration module.
//!
//! Handles loading, validating, and merging `xtickr.toml`. Stock defaults
//! are overridden by a user file, which in turn is overridden by CLI flags
//! for the per-run text options.
//!
//! ## Config File Location
//!
//! `xtickr.toml` in the working directory, or any file passed with
//! `--config`. Both are optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [crop]
//! aspect = "1:1"              # 1:1, 16:9, 4:3, 2:3 or free
//!
//! [background]
//! enabled = true              # Remove the background by default
//! command = ["rembg", "i", "{input}", "{output}"]
//!
//! [text]
//! size = 40                   # Pixel size (10-100)
//! color = "#FFFFFF"
//! opacity = 100               # Percent (0-100)
//! position = "bottom"         # bottom, top, center, custom
//! margin = 10                 # Distance from the edge for top/bottom
//! fonts = ["arial.ttf", "DejaVuSans.ttf"]
//! font_dirs = ["/usr/share/fonts", ...]
//!
//! [export]
//! size = 512                  # Square canvas edge
//! max_bytes = 102400          # 100 KiB ceiling
//! start_quality = 90
//! quality_step = 10
//! min_quality = 20
//! method = 6                  # libwebp effort (0-6)
//! name_prefix = "xtickr_sticker"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::color::parse_hex_rgb;
use crate::imaging::{ExportParams, Quality};
use crate::types::{Anchor, AspectRatio};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "xtickr.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `xtickr.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StickerConfig {
    /// Crop defaults.
    pub crop: CropConfig,
    /// Background removal defaults and the matting command.
    pub background: BackgroundConfig,
    /// Text overlay defaults and font lookup.
    pub text: TextConfig,
    /// Canvas size, byte ceiling and quality ladder.
    pub export: ExportConfig,
}

impl StickerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let export = &self.export;
        for (key, value) in [
            ("start_quality", export.start_quality),
            ("min_quality", export.min_quality),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "export.{key} must be 1-100"
                )));
            }
        }
        if export.min_quality > export.start_quality {
            return Err(ConfigError::Validation(
                "export.min_quality must not exceed export.start_quality".into(),
            ));
        }
        if export.quality_step == 0 {
            return Err(ConfigError::Validation(
                "export.quality_step must be positive".into(),
            ));
        }
        if export.size == 0 || export.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "export.size and export.max_bytes must be positive".into(),
            ));
        }
        if !(0..=6).contains(&export.method) {
            return Err(ConfigError::Validation("export.method must be 0-6".into()));
        }
        if export.name_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "export.name_prefix must not be empty".into(),
            ));
        }

        let text = &self.text;
        if !(10..=100).contains(&text.size) {
            return Err(ConfigError::Validation("text.size must be 10-100".into()));
        }
        if text.opacity > 100 {
            return Err(ConfigError::Validation("text.opacity must be 0-100".into()));
        }
        parse_hex_rgb(&text.color)
            .map_err(|e| ConfigError::Validation(format!("text.color: {e}")))?;

        let command = &self.background.command;
        if command.is_empty() {
            return Err(ConfigError::Validation(
                "background.command must not be empty".into(),
            ));
        }
        for placeholder in ["{input}", "{output}"] {
            if !command.iter().any(|arg| arg.contains(placeholder)) {
                return Err(ConfigError::Validation(format!(
                    "background.command must reference {placeholder}"
                )));
            }
        }
        Ok(())
    }
}

/// Crop defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Aspect lock used when `--aspect` is not given.
    pub aspect: AspectRatio,
}

/// Background removal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    /// Whether removal runs when neither `--keep-background` nor
    /// `--remove-background` is passed.
    pub enabled: bool,
    /// Matting command; `{input}` and `{output}` are replaced by PNG paths.
    pub command: Vec<String>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: ["rembg", "i", "{input}", "{output}"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Text overlay defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Pixel size for scalable fonts (10-100).
    pub size: u32,
    /// `#RRGGBB` fill color.
    pub color: String,
    /// Fill opacity in percent (0-100).
    pub opacity: u8,
    /// Anchor used when `--text-position` is not given.
    pub position: Anchor,
    /// Distance in pixels from the edge for top and bottom anchors.
    pub margin: u32,
    /// Font files to try, in order.
    pub fonts: Vec<String>,
    /// Directories searched (recursively) for each font name.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            size: 40,
            color: "#FFFFFF".to_string(),
            opacity: 100,
            position: Anchor::Bottom,
            margin: 10,
            fonts: vec!["arial.ttf".to_string(), "DejaVuSans.ttf".to_string()],
            font_dirs: default_font_dirs(),
        }
    }
}

/// Usual system font locations for the current platform.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let dirs: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\Fonts"]
    } else if cfg!(target_os = "macos") {
        &["/System/Library/Fonts", "/Library/Fonts"]
    } else {
        &["/usr/share/fonts", "/usr/local/share/fonts"]
    };
    dirs.iter().map(PathBuf::from).collect()
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Square canvas edge in pixels.
    pub size: u32,
    /// Byte ceiling the quality ladder aims for.
    pub max_bytes: u64,
    /// First quality tried.
    pub start_quality: u32,
    /// Quality decrement per attempt.
    pub quality_step: u32,
    /// Lowest quality tried.
    pub min_quality: u32,
    /// libwebp compression effort (0 fast - 6 smallest).
    pub method: i32,
    /// File name prefix, `<prefix>_<id>.webp`.
    pub name_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let params = ExportParams::default();
        Self {
            size: params.size,
            max_bytes: params.max_bytes,
            start_quality: params.start_quality.value(),
            quality_step: params.quality_step,
            min_quality: params.min_quality.value(),
            method: 6,
            name_prefix: params.name_prefix,
        }
    }
}

impl ExportConfig {
    pub fn to_params(&self) -> ExportParams {
        ExportParams {
            size: self.size,
            max_bytes: self.max_bytes,
            start_quality: Quality::new(self.start_quality),
            quality_step: self.quality_step,
            min_quality: Quality::new(self.min_quality),
            name_prefix: self.name_prefix.clone(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StickerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StickerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StickerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Otherwise `xtickr.toml` in `dir` is used
/// when present, and stock defaults when not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<StickerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = dir.join(CONFIG_FILE_NAME);
            if implicit.exists() {
                Some(load_raw_config(&implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `xtickr.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# xtickr Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the working directory as xtickr.toml, or pass it
# with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Crop
# ---------------------------------------------------------------------------
[crop]
# Aspect lock when --aspect is not given: "1:1", "16:9", "4:3", "2:3", "free".
aspect = "1:1"

# ---------------------------------------------------------------------------
# Background removal
# ---------------------------------------------------------------------------
[background]
# Remove the background unless --keep-background is passed.
enabled = true

# External matting tool. {input} is a PNG of the crop, {output} is the
# RGBA PNG the tool must write.
command = ["rembg", "i", "{input}", "{output}"]

# ---------------------------------------------------------------------------
# Text overlay
# ---------------------------------------------------------------------------
[text]
# Pixel size, 10-100.
size = 40

# Fill color as #RRGGBB.
color = "#FFFFFF"

# Fill opacity in percent, 0-100.
opacity = 100

# "bottom", "top", "center" or "custom" (previewed, drawn centered).
position = "bottom"

# Distance in pixels from the top/bottom edge.
margin = 10

# Font files tried in order. When none loads, a built-in 8x8 bitmap
# font is used.
fonts = ["arial.ttf", "DejaVuSans.ttf"]

# Directories searched recursively for the fonts above.
# font_dirs = ["/usr/share/fonts", "/usr/local/share/fonts"]

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Square canvas edge in pixels (WhatsApp stickers are 512x512).
size = 512

# File size ceiling in bytes (100 KiB).
max_bytes = 102400

# Quality ladder: start, step down, stop after the floor.
start_quality = 90
quality_step = 10
min_quality = 20

# libwebp effort, 0 (fast) to 6 (smallest).
method = 6

# Output name: <name_prefix>_<8 hex chars>.webp
name_prefix = "xtickr_sticker"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_sticker_limits() {
        let config = StickerConfig::default();
        assert_eq!(config.export.size, 512);
        assert_eq!(config.export.max_bytes, 102_400);
        assert_eq!(config.export.start_quality, 90);
        assert_eq!(config.export.min_quality, 20);
        assert_eq!(config.export.name_prefix, "xtickr_sticker");
        assert_eq!(config.text.position, Anchor::Bottom);
        assert_eq!(config.crop.aspect, AspectRatio::Square);
        assert!(config.background.enabled);
    }

    #[test]
    fn default_config_is_valid() {
        StickerConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[text]
color = "#ff0000"
position = "top"

[crop]
aspect = "16:9"
"##;
        let config: StickerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.text.color, "#ff0000");
        assert_eq!(config.text.position, Anchor::Top);
        assert_eq!(config.crop.aspect, AspectRatio::Wide);
        // Defaults preserved
        assert_eq!(config.text.size, 40);
        assert_eq!(config.export.method, 6);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: StickerConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = StickerConfig::default();
        assert_eq!(config.export.max_bytes, defaults.export.max_bytes);
        assert_eq!(config.text.fonts, defaults.text.fonts);
        assert_eq!(config.background.command, defaults.background.command);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r##"
[export]
quallity = 80
"##;
        assert!(toml::from_str::<StickerConfig>(toml).is_err());
    }

    #[test]
    fn export_config_to_params() {
        let params = ExportConfig {
            start_quality: 80,
            min_quality: 30,
            ..ExportConfig::default()
        }
        .to_params();
        assert_eq!(params.start_quality, Quality::new(80));
        assert_eq!(params.min_quality, Quality::new(30));
        assert_eq!(params.size, 512);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_overrides_scalars_and_keeps_siblings() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let base: toml::Value = toml::from_str("fonts = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("fonts = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["fonts"].as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, tmp.path()).unwrap();
        assert_eq!(config.export.max_bytes, 102_400);
    }

    #[test]
    fn load_config_reads_implicit_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[export]\nname_prefix = \"party\"\n",
        )
        .unwrap();

        let config = load_config(None, tmp.path()).unwrap();
        assert_eq!(config.export.name_prefix, "party");
        assert_eq!(config.export.size, 512);
    }

    #[test]
    fn explicit_path_wins_over_implicit_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[text]\nsize = 20\n").unwrap();
        let explicit = tmp.path().join("other.toml");
        fs::write(&explicit, "[text]\nsize = 60\n").unwrap();

        let config = load_config(Some(&explicit), tmp.path()).unwrap();
        assert_eq!(config.text.size, 60);
    }

    #[test]
    fn explicit_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");
        assert!(matches!(
            load_config(Some(&missing), tmp.path()),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn invalid_toml_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[export\n").unwrap();
        assert!(matches!(
            load_config(None, tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    fn validation_error(toml: &str) -> String {
        let overlay: toml::Value = toml::from_str(toml).unwrap();
        match resolve_config(stock_defaults_value(), Some(overlay)) {
            Err(ConfigError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_quality_range() {
        let msg = validation_error("[export]\nstart_quality = 30\nmin_quality = 40\n");
        assert!(msg.contains("min_quality"));
    }

    #[test]
    fn rejects_zero_step() {
        assert!(validation_error("[export]\nquality_step = 0\n").contains("quality_step"));
    }

    #[test]
    fn rejects_out_of_range_method() {
        assert!(validation_error("[export]\nmethod = 7\n").contains("method"));
    }

    #[test]
    fn rejects_bad_text_values() {
        assert!(validation_error("[text]\nsize = 5\n").contains("text.size"));
        assert!(validation_error("[text]\nopacity = 150\n").contains("text.opacity"));
        assert!(validation_error("[text]\ncolor = \"red\"\n").contains("text.color"));
    }

    #[test]
    fn rejects_command_without_placeholders() {
        let msg = validation_error("[background]\ncommand = [\"rembg\", \"i\", \"{input}\"]\n");
        assert!(msg.contains("{output}"));
        let msg = validation_error("[background]\ncommand = []\n");
        assert!(msg.contains("must not be empty"));
    }
}
