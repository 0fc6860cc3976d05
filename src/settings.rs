use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::font::FontSource;
use crate::config::GeneratorConfig;
use crate::foundation::core::{Rgb8, SizeBounds};
use crate::foundation::error::{MemeError, MemeResult};

/// How a background whose size differs from the canvas is fitted onto it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Resize to exactly the canvas size, ignoring aspect ratio.
    Stretch,
    /// Fit inside the canvas preserving aspect ratio; uncovered area gets the fill color.
    #[default]
    Contain,
    /// Fill the canvas preserving aspect ratio; overflow is center-cropped.
    Cover,
}

/// Per-render settings as supplied by the application layer.
///
/// Mirrors the flat key/value record the UI hands over; every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Caption text; `\n` forces a line break.
    pub text: String,
    /// Fill color of the caption.
    pub text_color: Rgb8,
    /// Requested (maximum) font size in pixels.
    pub font_size: u32,
    /// Draw a black outline under the glyphs.
    pub use_outline: bool,
    /// Outline radius in pixels; 0 draws no visible outline.
    pub outline_width: u32,
    /// Background image file.
    pub bg_path: Option<PathBuf>,
    /// Font file, resolved against [`GeneratorConfig::font_folder`].
    pub font_file: Option<PathBuf>,
    /// Background fitting policy.
    pub resize_mode: ResizeMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            text: String::new(),
            text_color: Rgb8::WHITE,
            font_size: 100,
            use_outline: true,
            outline_width: 2,
            bg_path: None,
            font_file: None,
            resize_mode: ResizeMode::Contain,
        }
    }
}

impl RenderSettings {
    /// Settings with only `text` changed.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> MemeResult<Self> {
        serde_json::from_str(s).map_err(|e| MemeError::serde(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

/// Fully resolved drawing style for one render call.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleOptions {
    /// Caption fill color.
    pub text_color: Rgb8,
    /// Outline enabled.
    pub outline: bool,
    /// Outline radius in pixels.
    pub outline_width: u32,
    /// Requested font, if any.
    pub font: Option<FontSource>,
    /// Size search bounds.
    pub sizes: SizeBounds,
}

impl StyleOptions {
    /// Combine per-call settings with generator constants.
    pub fn from_settings(settings: &RenderSettings, config: &GeneratorConfig) -> Self {
        Self {
            text_color: settings.text_color,
            outline: settings.use_outline,
            outline_width: settings.outline_width,
            font: settings
                .font_file
                .as_ref()
                .map(|f| FontSource::Path(config.font_folder.join(f))),
            sizes: SizeBounds {
                max: settings.font_size,
                min: config.min_font_size,
                step: config.font_size_step,
            },
        }
    }

    /// Outline radius actually drawn, zero when disabled.
    pub fn effective_outline(&self) -> u32 {
        if self.outline { self.outline_width } else { 0 }
    }
}
