use image::{DynamicImage, RgbImage};

use crate::assets::decode::load_background;
use crate::assets::font::{FontSource, SystemFont, TextEngine, resolve_face, system_default_font};
use crate::config::GeneratorConfig;
use crate::render::canvas::normalize;
use crate::render::draw::{DrawStats, draw_text, plan_lines};
use crate::settings::{RenderSettings, StyleOptions};
use crate::text::fit::{FitOutcome, fit, fit_builtin};
use crate::text::measure::FaceMetrics;

/// What a render call decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderReport {
    /// Selected font size in pixels (0 when nothing was laid out).
    pub size: u32,
    /// How the size was chosen; `None` for empty captions.
    pub outcome: Option<FitOutcome>,
    /// Lines produced by the wrapper.
    pub lines_total: usize,
    /// Lines that fit inside the region and were painted.
    pub lines_drawn: usize,
    /// Glyph fills issued, outline copies included.
    pub draw_calls: usize,
}

/// Finished canvas plus its report.
#[derive(Clone, Debug)]
pub struct Rendered {
    /// Canvas-sized RGB image owned by the caller.
    pub image: RgbImage,
    /// Decisions taken while rendering.
    pub report: RenderReport,
}

/// Text-fitting compositor.
///
/// Holds only immutable configuration and the system fallback font bytes; every call builds its
/// own font and layout state, so one instance can serve concurrent callers.
#[derive(Clone, Debug)]
pub struct Compositor {
    config: GeneratorConfig,
    system_font: Option<SystemFont>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Compositor {
    /// Compositor over `config`.
    ///
    /// With `system_font_fallback` on, system fonts are scanned here, once.
    pub fn new(config: GeneratorConfig) -> Self {
        let system_font = if config.system_font_fallback {
            system_default_font()
        } else {
            None
        };
        tracing::debug!(found = system_font.is_some(), "system fallback font");
        Self {
            config,
            system_font,
        }
    }

    /// Generator constants this compositor renders with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render using the paths named in `settings`.
    ///
    /// An unreadable background is logged and replaced with the fill color.
    #[tracing::instrument(skip(self, settings), fields(chars = settings.text.chars().count()))]
    pub fn render(&self, settings: &RenderSettings) -> Rendered {
        let background = settings.bg_path.as_ref().and_then(|path| {
            match load_background(path, self.config.canvas.fill_color) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "background unusable, using fill");
                    None
                }
            }
        });
        self.render_with(settings, background.as_ref(), None)
    }

    /// Render with an already-decoded background and an optional font override.
    ///
    /// `font` takes precedence over `settings.font_file`. Never fails: font problems degrade to
    /// fallback faces and draw problems leave the normalized background untouched.
    #[tracing::instrument(skip_all)]
    pub fn render_with(
        &self,
        settings: &RenderSettings,
        background: Option<&DynamicImage>,
        font: Option<FontSource>,
    ) -> Rendered {
        let cfg = &self.config;
        let mut image = normalize(background, &cfg.canvas, settings.resize_mode);

        let mut report = RenderReport {
            size: 0,
            outcome: None,
            lines_total: 0,
            lines_drawn: 0,
            draw_calls: 0,
        };
        if settings.text.is_empty() {
            return Rendered { image, report };
        }

        let mut style = StyleOptions::from_settings(settings, cfg);
        if font.is_some() {
            style.font = font;
        }
        let metrics = cfg.line_metrics();

        let mut engine = TextEngine::new();
        let face = resolve_face(&mut engine, style.font.as_ref(), self.system_font.as_ref());

        let fitted = if face.is_builtin() {
            fit_builtin(&settings.text, style.sizes, &metrics)
        } else {
            let mut measure = FaceMetrics::new(&mut engine, &face);
            fit(
                &settings.text,
                &mut measure,
                style.sizes,
                cfg.region.max_width,
                cfg.region.max_height,
                &metrics,
            )
        };

        report.size = fitted.size;
        report.outcome = Some(fitted.outcome);
        report.lines_total = fitted.layout.lines.len();

        let placed = plan_lines(&fitted.layout, &cfg.region, cfg.canvas.width);
        let before = image.clone();
        match draw_text(
            &mut image,
            &placed,
            &face,
            &mut engine,
            fitted.size as f32,
            fitted.layout.line_height,
            &style,
        ) {
            Ok(DrawStats {
                lines_drawn,
                draw_calls,
            }) => {
                report.lines_drawn = lines_drawn;
                report.draw_calls = draw_calls;
            }
            Err(e) => {
                tracing::warn!(error = %e, "text draw failed, returning background");
                image = before;
            }
        }

        tracing::debug!(?report, "rendered");
        Rendered { image, report }
    }
}
