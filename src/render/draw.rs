use image::RgbImage;
use kurbo::{Affine, Point};

use crate::assets::font::{BuiltinFace, FontFace, TextBrush, TextEngine};
use crate::foundation::core::{Rgb8, TextRegion};
use crate::foundation::error::{MemeError, MemeResult};
use crate::settings::StyleOptions;
use crate::text::wrap::LineLayout;

/// A wrapped line with its top-left position on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    /// Line contents.
    pub text: String,
    /// Top-left corner of the line box.
    pub origin: Point,
    /// Measured width.
    pub width: f32,
}

/// Counters from one draw pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DrawStats {
    /// Lines painted.
    pub lines_drawn: usize,
    /// Glyph-run / box-batch fills issued, outline copies included.
    pub draw_calls: usize,
}

/// Position lines bottom-anchored in `region` and centered on the canvas.
///
/// The block's bottom edge sits on `region.bottom_y`; a block taller than the region starts at
/// `region.top_y()` instead, and lines whose box would cross `bottom_y` are dropped.
pub fn plan_lines(layout: &LineLayout, region: &TextRegion, canvas_width: u32) -> Vec<PlacedLine> {
    let lh = i64::from(layout.line_height);
    let bottom = i64::from(region.bottom_y);
    let top = i64::from(region.top_y());
    let total = i64::try_from(layout.total_height()).unwrap_or(i64::MAX);
    let start_y = bottom.saturating_sub(total).max(top);

    let mut out = Vec::with_capacity(layout.lines.len());
    for (i, line) in layout.lines.iter().enumerate() {
        let y = start_y + (i as i64) * lh;
        if y + lh > bottom {
            tracing::debug!(
                dropped = layout.lines.len() - i,
                "caption overflows region, dropping trailing lines"
            );
            break;
        }
        let x = ((canvas_width as f32 - line.width) / 2.0).floor();
        out.push(PlacedLine {
            text: line.text.clone(),
            origin: Point::new(f64::from(x), y as f64),
            width: line.width,
        });
    }
    out
}

/// Glyphs of one line, ready to be filled at any offset.
enum LineInk {
    Runs(Vec<GlyphRun>),
    Boxes(Vec<vello_cpu::kurbo::Rect>),
}

struct GlyphRun {
    font_size: f32,
    brush: TextBrush,
    glyphs: Vec<vello_cpu::Glyph>,
}

fn line_ink(
    engine: &mut TextEngine,
    face: &FontFace,
    text: &str,
    size_px: f32,
    line_height: u32,
    brush: TextBrush,
) -> MemeResult<LineInk> {
    match face {
        FontFace::Scalable(face) => {
            let layout = engine.layout_line(face, text, size_px, brush)?;
            let mut runs = Vec::new();
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    runs.push(GlyphRun {
                        font_size: run.run().font_size(),
                        brush: run.style().brush,
                        // Pen position with run offset and baseline applied.
                        glyphs: run
                            .positioned_glyphs()
                            .map(|g| vello_cpu::Glyph {
                                id: g.id,
                                x: g.x,
                                y: g.y,
                            })
                            .collect(),
                    });
                }
            }
            Ok(LineInk::Runs(runs))
        }
        FontFace::Builtin(_) => {
            let adv = f64::from(BuiltinFace::advance(size_px));
            let lh = f64::from(line_height);
            let boxes = text
                .chars()
                .enumerate()
                .filter(|(_, ch)| !ch.is_whitespace() && !ch.is_control())
                .map(|(i, _)| {
                    let x0 = i as f64 * adv;
                    vello_cpu::kurbo::Rect::new(
                        x0 + adv * 0.15,
                        lh * 0.2,
                        x0 + adv * 0.85,
                        lh * 0.8,
                    )
                })
                .collect();
            Ok(LineInk::Boxes(boxes))
        }
    }
}

fn fill_ink(
    ctx: &mut vello_cpu::RenderContext,
    face: &FontFace,
    ink: &LineInk,
    origin: Point,
    color: Option<Rgb8>,
) -> usize {
    ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
    match (ink, face) {
        (LineInk::Runs(runs), FontFace::Scalable(face)) => {
            for run in runs {
                let (r, g, b, a) = match color {
                    Some(c) => (c.r, c.g, c.b, 255),
                    None => (run.brush.r, run.brush.g, run.brush.b, run.brush.a),
                };
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.glyph_run(face.data())
                    .font_size(run.font_size)
                    .fill_glyphs(run.glyphs.iter().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    }));
            }
            runs.len()
        }
        (LineInk::Boxes(boxes), _) => {
            if boxes.is_empty() {
                return 0;
            }
            let c = color.unwrap_or(Rgb8::WHITE);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255));
            for rect in boxes {
                ctx.fill_rect(rect);
            }
            1
        }
        (LineInk::Runs(_), FontFace::Builtin(_)) => 0,
    }
}

/// Paint placed lines onto `canvas`.
///
/// When the outline is enabled with a non-zero width, black copies of every line are filled at each
/// integer offset in `[-w, w]^2` except the origin before the fill pass, so the outline only ever
/// adds ink around the glyphs. The fill color is painted last. Performs no I/O.
pub fn draw_text(
    canvas: &mut RgbImage,
    placed: &[PlacedLine],
    face: &FontFace,
    engine: &mut TextEngine,
    size_px: f32,
    line_height: u32,
    style: &StyleOptions,
) -> MemeResult<DrawStats> {
    if placed.is_empty() {
        return Ok(DrawStats::default());
    }

    let (width, height) = canvas.dimensions();
    let w: u16 = width
        .try_into()
        .map_err(|_| MemeError::validation("canvas width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MemeError::validation("canvas height exceeds u16"))?;

    let brush = TextBrush::opaque(style.text_color);
    let outline = i64::from(style.effective_outline());
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let mut stats = DrawStats::default();

    for line in placed {
        let ink = line_ink(engine, face, &line.text, size_px, line_height, brush)?;

        for dy in -outline..=outline {
            for dx in -outline..=outline {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let at = Point::new(line.origin.x + dx as f64, line.origin.y + dy as f64);
                stats.draw_calls += fill_ink(&mut ctx, face, &ink, at, Some(Rgb8::BLACK));
            }
        }

        let fill = match face {
            FontFace::Scalable(_) => None,
            FontFace::Builtin(_) => Some(style.text_color),
        };
        stats.draw_calls += fill_ink(&mut ctx, face, &ink, line.origin, fill);
        stats.lines_drawn += 1;
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    composite_over_rgb(canvas, pixmap.data_as_u8_slice())?;
    Ok(stats)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn mul_div255_u8(x: u16, y: u16) -> u8 {
    ((x * y + 127) / 255) as u8
}

/// Source-over of premultiplied RGBA8 onto an opaque RGB image of the same size.
fn composite_over_rgb(dst: &mut RgbImage, src_premul: &[u8]) -> MemeResult<()> {
    let expected = (dst.width() as usize)
        .saturating_mul(dst.height() as usize)
        .saturating_mul(4);
    if src_premul.len() != expected {
        return Err(MemeError::image("text layer byte len mismatch"));
    }
    for (d, s) in dst.pixels_mut().zip(src_premul.chunks_exact(4)) {
        let a = s[3];
        if a == 0 {
            continue;
        }
        let inv = 255 - u16::from(a);
        for c in 0..3 {
            d.0[c] = s[c].saturating_add(mul_div255_u8(u16::from(d.0[c]), inv));
        }
    }
    Ok(())
}
