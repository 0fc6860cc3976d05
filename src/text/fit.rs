use crate::assets::font::BuiltinFace;
use crate::foundation::core::SizeBounds;
use crate::text::measure::TextMeasure;
use crate::text::wrap::{LineLayout, LineMetricsConfig, MeasuredLine, wrap};

/// How the final size was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitOutcome {
    /// The largest candidate whose block fits the region.
    Fitted,
    /// Nothing fit; wrapped at the minimum size and may overflow the region.
    ForcedMinimum,
    /// No scalable face was available; the whole caption is one builtin-face line.
    BuiltinFallback,
}

/// Selected font size and the wrap computed at that size.
#[derive(Clone, Debug, PartialEq)]
pub struct FitResult {
    /// Font size in pixels.
    pub size: u32,
    /// Lines wrapped at `size`.
    pub layout: LineLayout,
    /// Search outcome.
    pub outcome: FitOutcome,
}

/// Find the largest font size whose wrapped block fits `max_height`.
///
/// Candidates descend from `bounds.max` by `bounds.step` and never go below `bounds.min`. When
/// none fits, the text is wrapped again at `bounds.min` and returned as
/// [`FitOutcome::ForcedMinimum`]. The result depends only on the arguments.
pub fn fit<M: TextMeasure + ?Sized>(
    text: &str,
    measure: &mut M,
    bounds: SizeBounds,
    max_width: u32,
    max_height: u32,
    metrics: &LineMetricsConfig,
) -> FitResult {
    let max_width = max_width as f32;
    for size in bounds.candidates() {
        let layout = wrap(text, measure, size as f32, max_width, metrics);
        let total = layout.total_height();
        tracing::debug!(size, lines = layout.lines.len(), total, "fit candidate");
        if total <= u64::from(max_height) {
            return FitResult {
                size,
                layout,
                outcome: FitOutcome::Fitted,
            };
        }
    }

    tracing::debug!(min = bounds.min, "no candidate fits, forcing minimum size");
    FitResult {
        size: bounds.min,
        layout: wrap(text, measure, bounds.min as f32, max_width, metrics),
        outcome: FitOutcome::ForcedMinimum,
    }
}

/// Degraded layout for the builtin face: the entire text on one line at `bounds.min`.
pub fn fit_builtin(text: &str, bounds: SizeBounds, metrics: &LineMetricsConfig) -> FitResult {
    let size = bounds.min;
    FitResult {
        size,
        layout: LineLayout {
            lines: vec![MeasuredLine {
                text: text.to_owned(),
                width: BuiltinFace::text_width(text, size as f32),
            }],
            line_height: metrics.fallback_line_height,
        },
        outcome: FitOutcome::BuiltinFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::measure::fake::Monospace;

    fn bounds(max: u32) -> SizeBounds {
        SizeBounds {
            max,
            min: 20,
            step: 5,
        }
    }

    #[test]
    fn single_char_fits_at_requested_size() {
        let r = fit(
            "A",
            &mut Monospace,
            bounds(100),
            800,
            300,
            &LineMetricsConfig::default(),
        );
        assert_eq!(r.outcome, FitOutcome::Fitted);
        assert_eq!(r.size, 100);
        assert_eq!(r.layout.texts(), vec!["A"]);
    }

    #[test]
    fn shrinks_until_block_fits() {
        // 40 CJK chars: at 100px, 8 per line => 5 lines * 110 = 550 > 300.
        let text: String = std::iter::repeat_n('字', 40).collect();
        let r = fit(
            &text,
            &mut Monospace,
            bounds(100),
            800,
            300,
            &LineMetricsConfig::default(),
        );
        assert_eq!(r.outcome, FitOutcome::Fitted);
        assert!(r.size < 100 && r.size >= 20);
        assert!(r.layout.total_height() <= 300);

        // The next larger candidate must not have fit.
        let bigger = wrap(
            &text,
            &mut Monospace,
            (r.size + 5) as f32,
            800.0,
            &LineMetricsConfig::default(),
        );
        assert!(bigger.total_height() > 300);
    }

    #[test]
    fn pathological_text_forces_minimum_with_fresh_wrap() {
        let text: String = std::iter::repeat_n('字', 500).collect();
        let metrics = LineMetricsConfig::default();
        let r = fit(&text, &mut Monospace, bounds(100), 800, 300, &metrics);
        assert_eq!(r.outcome, FitOutcome::ForcedMinimum);
        assert_eq!(r.size, 20);
        assert_eq!(r.layout, wrap(&text, &mut Monospace, 20.0, 800.0, &metrics));
        assert_eq!(r.layout.lines.len(), 13);
        assert!(r.layout.total_height() > 300);
    }

    #[test]
    fn selected_size_stays_within_bounds() {
        let metrics = LineMetricsConfig::default();
        for text in ["", "A", "hello\nworld", "一二三四五六七八九十"] {
            for max in [5, 20, 21, 64, 100, 250] {
                let b = bounds(max);
                let r = fit(text, &mut Monospace, b, 800, 300, &metrics);
                assert!(r.size >= b.min, "{text:?} {max}");
                assert!(r.size <= b.effective_max(), "{text:?} {max}");
            }
        }
    }

    #[test]
    fn search_is_deterministic() {
        let metrics = LineMetricsConfig::default();
        let text = "deterministic fitting\n确定性";
        let a = fit(text, &mut Monospace, bounds(90), 800, 300, &metrics);
        let b = fit(text, &mut Monospace, bounds(90), 800, 300, &metrics);
        assert_eq!(a, b);
    }

    #[test]
    fn builtin_fallback_is_one_line_at_min() {
        let metrics = LineMetricsConfig::default();
        let r = fit_builtin("two\nlines", bounds(100), &metrics);
        assert_eq!(r.outcome, FitOutcome::BuiltinFallback);
        assert_eq!(r.size, 20);
        assert_eq!(r.layout.lines.len(), 1);
        assert_eq!(r.layout.line_height, 30);
        assert_eq!(r.layout.lines[0].width, 90.0);
    }
}
