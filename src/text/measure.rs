use crate::assets::font::{BuiltinFace, FontFace, TextBrush, TextEngine};

/// Font metric queries needed by wrapping and fitting.
///
/// Returning `None` means the metric is unavailable (corrupt or incompatible face); callers fall
/// back to estimates instead of failing.
pub trait TextMeasure {
    /// Rendered advance width of `text` on one line at `size_px`.
    fn advance_width(&mut self, text: &str, size_px: f32) -> Option<f32>;

    /// Height of `reference` (ascender to descender) at `size_px`.
    fn reference_height(&mut self, reference: &str, size_px: f32) -> Option<f32>;
}

/// Crude width used when a face cannot be measured.
pub fn estimated_width(text: &str, size_px: f32) -> f32 {
    text.chars().count() as f32 * (size_px / 2.0)
}

/// [`TextMeasure`] over a resolved [`FontFace`].
pub struct FaceMetrics<'a> {
    engine: &'a mut TextEngine,
    face: &'a FontFace,
}

impl<'a> FaceMetrics<'a> {
    /// Measure with `face`, shaping through `engine`.
    pub fn new(engine: &'a mut TextEngine, face: &'a FontFace) -> Self {
        Self { engine, face }
    }
}

impl TextMeasure for FaceMetrics<'_> {
    fn advance_width(&mut self, text: &str, size_px: f32) -> Option<f32> {
        match self.face {
            FontFace::Builtin(_) => Some(BuiltinFace::text_width(text, size_px)),
            FontFace::Scalable(face) => {
                match self
                    .engine
                    .layout_line(face, text, size_px, TextBrush::default())
                {
                    Ok(layout) if layout.width().is_finite() => Some(layout.width()),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::debug!(error = %e, "width query failed");
                        None
                    }
                }
            }
        }
    }

    fn reference_height(&mut self, reference: &str, size_px: f32) -> Option<f32> {
        match self.face {
            FontFace::Builtin(_) => Some(size_px),
            FontFace::Scalable(face) => {
                match self
                    .engine
                    .layout_line(face, reference, size_px, TextBrush::default())
                {
                    Ok(layout) if layout.height().is_finite() && layout.height() > 0.0 => {
                        Some(layout.height())
                    }
                    Ok(_) => None,
                    Err(e) => {
                        tracing::debug!(error = %e, "height query failed");
                        None
                    }
                }
            }
        }
    }
}

/// Deterministic stand-in faces for tests.
#[cfg(test)]
pub(crate) mod fake {
    use super::TextMeasure;

    /// Latin glyphs advance `0.6 * size`, wide (CJK) glyphs a full `size`.
    pub(crate) struct Monospace;

    pub(crate) fn char_advance(ch: char, size_px: f32) -> f32 {
        if (ch as u32) >= 0x2E80 {
            size_px
        } else {
            size_px * 0.6
        }
    }

    impl TextMeasure for Monospace {
        fn advance_width(&mut self, text: &str, size_px: f32) -> Option<f32> {
            Some(text.chars().map(|c| char_advance(c, size_px)).sum())
        }

        fn reference_height(&mut self, _reference: &str, size_px: f32) -> Option<f32> {
            Some(size_px)
        }
    }

    /// A face whose metric queries always fail.
    pub(crate) struct Broken;

    impl TextMeasure for Broken {
        fn advance_width(&mut self, _text: &str, _size_px: f32) -> Option<f32> {
            None
        }

        fn reference_height(&mut self, _reference: &str, _size_px: f32) -> Option<f32> {
            None
        }
    }
}
