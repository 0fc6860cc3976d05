use crate::text::measure::{TextMeasure, estimated_width};

/// Parameters that turn a face's reference height into a uniform line pitch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMetricsConfig {
    /// String measured for the pitch instead of the caption itself.
    pub reference_text: String,
    /// Gap added below every line.
    pub line_spacing: u32,
    /// Pitch used when the reference cannot be measured.
    pub fallback_line_height: u32,
}

impl Default for LineMetricsConfig {
    fn default() -> Self {
        Self {
            reference_text: "Ay".to_owned(),
            line_spacing: 10,
            fallback_line_height: 30,
        }
    }
}

/// One wrapped line and its measured width at the layout's font size.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredLine {
    /// Line contents, without any newline.
    pub text: String,
    /// Rendered width in pixels.
    pub width: f32,
}

/// Wrapped caption: ordered lines sharing one line pitch.
#[derive(Clone, Debug, PartialEq)]
pub struct LineLayout {
    /// Lines top to bottom.
    pub lines: Vec<MeasuredLine>,
    /// Vertical distance between consecutive line tops.
    pub line_height: u32,
}

impl LineLayout {
    /// Height of the whole block.
    pub fn total_height(&self) -> u64 {
        self.lines.len() as u64 * u64::from(self.line_height)
    }

    /// Line contents only.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Line pitch of a face at `size_px`.
pub fn line_height<M: TextMeasure + ?Sized>(
    measure: &mut M,
    size_px: f32,
    metrics: &LineMetricsConfig,
) -> u32 {
    match measure.reference_height(&metrics.reference_text, size_px) {
        Some(h) => (h.ceil() as u32).saturating_add(metrics.line_spacing),
        None => metrics.fallback_line_height,
    }
}

/// Wrap `text` into lines no wider than `max_width` at `size_px`.
///
/// `\n` always breaks (a trailing `\r` is dropped). Inside a paragraph characters are appended one
/// at a time and a line is closed just before the first character that would push it past
/// `max_width`; there is no word-boundary preference. A character wider than `max_width` on its
/// own still gets its own line. Empty paragraphs contribute no lines.
pub fn wrap<M: TextMeasure + ?Sized>(
    text: &str,
    measure: &mut M,
    size_px: f32,
    max_width: f32,
    metrics: &LineMetricsConfig,
) -> LineLayout {
    let mut width_of = |s: &str| {
        measure
            .advance_width(s, size_px)
            .unwrap_or_else(|| estimated_width(s, size_px))
    };

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for ch in paragraph.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            let w = width_of(&candidate);
            if w <= max_width || current.is_empty() {
                current = candidate;
                current_w = w;
            } else {
                lines.push(MeasuredLine {
                    text: std::mem::take(&mut current),
                    width: current_w,
                });
                current.push(ch);
                current_w = width_of(&current);
            }
        }

        if !current.is_empty() {
            lines.push(MeasuredLine {
                text: current,
                width: current_w,
            });
        }
    }

    LineLayout {
        lines,
        line_height: line_height(measure, size_px, metrics),
    }
}
