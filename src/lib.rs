//! memefit fits captions onto fixed-size meme canvases.
//!
//! A render call normalizes the background to the canvas size, picks the largest font size whose
//! wrapped caption fits the text region, then draws the lines centered and bottom-anchored with an
//! optional black outline. Every step has a fallback, so a call always yields an image:
//!
//! ```no_run
//! use memefit::{Compositor, GeneratorConfig, RenderSettings};
//!
//! let compositor = Compositor::new(GeneratorConfig::default());
//! let out = compositor.render(&RenderSettings::with_text("when the build is green"));
//! memefit::export::save_png(&out.image, "meme.png")?;
//! # Ok::<(), memefit::MemeError>(())
//! ```
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod export;
pub mod foundation;
pub mod render;
pub mod resources;
pub mod settings;
pub mod text;

pub use crate::assets::font::{FontFace, FontSource};
pub use crate::config::GeneratorConfig;
pub use crate::foundation::core::{CanvasSpec, Rgb8, SizeBounds, TextRegion};
pub use crate::foundation::error::{MemeError, MemeResult};
pub use crate::render::compositor::{Compositor, RenderReport, Rendered};
pub use crate::settings::{RenderSettings, ResizeMode, StyleOptions};
pub use crate::text::fit::{FitOutcome, FitResult};
pub use crate::text::wrap::LineLayout;
