use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{CanvasSpec, TextRegion};
use crate::foundation::error::{MemeError, MemeResult};
use crate::text::wrap::LineMetricsConfig;

/// Generator-wide constants: canvas, text region, search bounds and resource folders.
///
/// Every field has a default, so a JSON file only needs to name what it overrides:
///
/// ```json
/// { "min_font_size": 16, "region": { "max_width": 820, "bottom_y": 870, "max_height": 280 } }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Output raster.
    pub canvas: CanvasSpec,
    /// Area captions are fitted into.
    pub region: TextRegion,
    /// Smallest font size the search may select.
    pub min_font_size: u32,
    /// Decrement between search candidates.
    pub font_size_step: u32,
    /// Extra pixels added to the measured reference height to form the line pitch.
    pub line_spacing: u32,
    /// Line pitch used when font metrics are unavailable.
    pub fallback_line_height: u32,
    /// String measured to derive line height; should cover ascenders and descenders.
    pub reference_text: String,
    /// Folder `font_file` settings are resolved against.
    pub font_folder: PathBuf,
    /// Folder scanned for background images.
    pub bg_folder: PathBuf,
    /// Folder generated images are written into.
    pub output_folder: PathBuf,
    /// Try an installed sans-serif face before the builtin box face.
    pub system_font_fallback: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSpec::default(),
            region: TextRegion::default(),
            min_font_size: 20,
            font_size_step: 5,
            line_spacing: 10,
            fallback_line_height: 30,
            reference_text: "Ay".to_owned(),
            font_folder: PathBuf::from("Font"),
            bg_folder: PathBuf::from("background_images"),
            output_folder: PathBuf::from("output_images"),
            system_font_fallback: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> MemeResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| MemeError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> MemeResult<()> {
        self.canvas.validate()?;
        self.region.validate(&self.canvas)?;
        if self.min_font_size == 0 {
            return Err(MemeError::validation("min_font_size must be > 0"));
        }
        if self.font_size_step == 0 {
            return Err(MemeError::validation("font_size_step must be > 0"));
        }
        if self.fallback_line_height == 0 {
            return Err(MemeError::validation("fallback_line_height must be > 0"));
        }
        if self.reference_text.is_empty() {
            return Err(MemeError::validation("reference_text must be non-empty"));
        }
        Ok(())
    }

    /// Line pitch parameters for the wrapper.
    pub fn line_metrics(&self) -> LineMetricsConfig {
        LineMetricsConfig {
            reference_text: self.reference_text.clone(),
            line_spacing: self.line_spacing,
            fallback_line_height: self.fallback_line_height,
        }
    }
}
