use memefit::render::draw::plan_lines;
use memefit::text::fit::fit;
use memefit::text::measure::TextMeasure;
use memefit::{
    Compositor, FitOutcome, GeneratorConfig, RenderSettings, ResizeMode, SizeBounds, TextRegion,
};

/// Fixed-advance face: latin `0.6 * size`, CJK a full `size`.
struct Monospace;

impl TextMeasure for Monospace {
    fn advance_width(&mut self, text: &str, size_px: f32) -> Option<f32> {
        Some(
            text.chars()
                .map(|c| if (c as u32) >= 0x2E80 { 1.0 } else { 0.6 })
                .sum::<f32>()
                * size_px,
        )
    }

    fn reference_height(&mut self, _reference: &str, size_px: f32) -> Option<f32> {
        Some(size_px)
    }
}

fn offline_compositor() -> Compositor {
    Compositor::new(GeneratorConfig {
        system_font_fallback: false,
        ..GeneratorConfig::default()
    })
}

fn bounds(max: u32) -> SizeBounds {
    SizeBounds {
        max,
        min: 20,
        step: 5,
    }
}

#[test]
fn single_char_fits_at_requested_size_and_is_centered() {
    let cfg = GeneratorConfig::default();
    let r = fit(
        "A",
        &mut Monospace,
        bounds(100),
        cfg.region.max_width,
        cfg.region.max_height,
        &cfg.line_metrics(),
    );
    assert_eq!(r.outcome, FitOutcome::Fitted);
    assert_eq!(r.size, 100);
    assert_eq!(r.layout.texts(), vec!["A"]);

    let placed = plan_lines(&r.layout, &cfg.region, cfg.canvas.width);
    assert_eq!(placed.len(), 1);
    let center = placed[0].origin.x + f64::from(placed[0].width) / 2.0;
    assert!((center - 450.0).abs() <= 1.0);
    assert_eq!(placed[0].origin.y + f64::from(r.layout.line_height), 880.0);
}

#[test]
fn pathological_text_shrinks_to_minimum_and_drops_overflow() {
    let cfg = GeneratorConfig::default();
    let text: String = std::iter::repeat_n('字', 500).collect();
    let r = fit(
        &text,
        &mut Monospace,
        bounds(100),
        cfg.region.max_width,
        cfg.region.max_height,
        &cfg.line_metrics(),
    );
    assert_eq!(r.outcome, FitOutcome::ForcedMinimum);
    assert_eq!(r.size, 20);
    assert!(r.layout.lines.len() > 1);

    let placed = plan_lines(&r.layout, &cfg.region, cfg.canvas.width);
    assert!(placed.len() < r.layout.lines.len());
    assert_eq!(placed[0].origin.y, f64::from(cfg.region.top_y()));
    let lh = f64::from(r.layout.line_height);
    assert!(
        placed
            .iter()
            .all(|p| p.origin.y + lh <= f64::from(cfg.region.bottom_y))
    );
}

#[test]
fn explicit_newline_gives_two_lines() {
    let cfg = GeneratorConfig::default();
    let r = fit(
        "hi\nyo",
        &mut Monospace,
        bounds(100),
        cfg.region.max_width,
        cfg.region.max_height,
        &cfg.line_metrics(),
    );
    assert_eq!(r.layout.texts(), vec!["hi", "yo"]);
}

#[test]
fn missing_background_renders_solid_fill_canvas() {
    let settings = RenderSettings {
        text: "fallback".to_owned(),
        bg_path: Some("does/not/exist.png".into()),
        ..RenderSettings::default()
    };
    let out = offline_compositor().render(&settings);
    assert_eq!(out.image.dimensions(), (900, 900));
    // Above the text region nothing is drawn.
    for y in 0..580 {
        for x in (0..900).step_by(7) {
            assert_eq!(out.image.get_pixel(x, y).0, [128, 128, 128]);
        }
    }
}

#[test]
fn repeated_renders_are_identical() {
    let comp = offline_compositor();
    let settings = RenderSettings::with_text("same input\nsame output");
    let a = comp.render(&settings);
    let b = comp.render(&settings);
    assert_eq!(a.image, b.image);
    assert_eq!(a.report, b.report);
}

#[test]
fn in_memory_background_is_fitted_to_canvas() {
    let bg = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        300,
        150,
        image::Rgb([0, 200, 0]),
    ));
    let comp = offline_compositor();
    for mode in [ResizeMode::Stretch, ResizeMode::Contain, ResizeMode::Cover] {
        let settings = RenderSettings {
            resize_mode: mode,
            ..RenderSettings::default()
        };
        let out = comp.render_with(&settings, Some(&bg), None);
        assert_eq!(out.image.dimensions(), (900, 900));
        assert_eq!(out.image.get_pixel(450, 450).0, [0, 200, 0]);
        assert_eq!(out.report.draw_calls, 0);
    }
}

#[test]
fn custom_region_is_respected() {
    let cfg = GeneratorConfig {
        system_font_fallback: false,
        region: TextRegion {
            max_width: 400,
            bottom_y: 400,
            max_height: 100,
        },
        ..GeneratorConfig::default()
    };
    cfg.validate().unwrap();
    let out = Compositor::new(cfg).render(&RenderSettings::with_text("top"));
    assert_eq!(out.report.lines_drawn, 1);
    for (_, y, p) in out.image.enumerate_pixels() {
        if p.0 != [128, 128, 128] {
            assert!((300..400).contains(&y), "ink at y={y}");
        }
    }
}

const BLUE: [u8; 3] = [0, 0, 255];

/// Compositor backed by an installed font, or `None` on machines without one.
fn system_compositor() -> Option<Compositor> {
    memefit::assets::font::system_default_font()?;
    Some(Compositor::new(GeneratorConfig::default()))
}

fn render_on_blue(comp: &Compositor, text: &str, outline: u32) -> memefit::Rendered {
    let bg = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        900,
        900,
        image::Rgb(BLUE),
    ));
    let settings = RenderSettings {
        text: text.to_owned(),
        text_color: memefit::Rgb8::new(255, 0, 0),
        use_outline: outline > 0,
        outline_width: outline,
        ..RenderSettings::default()
    };
    comp.render_with(&settings, Some(&bg), None)
}

/// `(x0, y0, x1, y1)` of every pixel that differs from the blue background, inclusive.
fn ink_bounds(img: &image::RgbImage) -> Option<(u32, u32, u32, u32)> {
    img.enumerate_pixels()
        .filter(|(_, _, p)| p.0 != BLUE)
        .fold(None, |acc, (x, y, _)| match acc {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

#[test]
fn system_font_line_is_centered_inside_region() {
    let Some(comp) = system_compositor() else {
        return;
    };
    let out = render_on_blue(&comp, "HHHH", 0);
    assert_eq!(out.report.outcome, Some(FitOutcome::Fitted));
    assert_eq!(out.report.size, 100);
    assert_eq!(out.report.lines_drawn, 1);

    let (x0, y0, x1, y1) = ink_bounds(&out.image).expect("text was drawn");
    assert!(x1 - x0 > 200, "four 100px glyphs span only {}px", x1 - x0);
    let center = f64::from(x0 + x1 + 1) / 2.0;
    assert!((center - 450.0).abs() <= 3.0, "ink centered at {center}");

    let region = comp.config().region;
    assert!(y0 >= region.top_y(), "ink above region at y={y0}");
    assert!(y1 < region.bottom_y, "ink below region at y={y1}");
}

#[test]
fn system_font_overflowing_block_stays_inside_region() {
    let Some(comp) = system_compositor() else {
        return;
    };
    let text: String = std::iter::repeat_n('H', 400).collect();
    let out = render_on_blue(&comp, &text, 0);
    assert!(out.report.lines_drawn > 1);

    let region = comp.config().region;
    let (_, y0, _, y1) = ink_bounds(&out.image).expect("text was drawn");
    assert!(y0 >= region.top_y(), "ink above region at y={y0}");
    assert!(y1 < region.bottom_y, "ink below region at y={y1}");
}

#[test]
fn system_font_outline_only_adds_ink() {
    let Some(comp) = system_compositor() else {
        return;
    };
    let plain = render_on_blue(&comp, "Hi there", 0).image;
    let outlined = render_on_blue(&comp, "Hi there", 2).image;

    let mut plain_ink = 0;
    let mut outlined_ink = 0;
    for (p, o) in plain.pixels().zip(outlined.pixels()) {
        if p.0 != BLUE {
            plain_ink += 1;
            assert_ne!(o.0, BLUE);
        }
        if o.0 != BLUE {
            outlined_ink += 1;
        }
    }
    assert!(plain_ink > 0);
    assert!(outlined_ink > plain_ink);
    assert!(outlined.pixels().any(|p| p.0 == [0, 0, 0]));
}
