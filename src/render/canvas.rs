use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

use crate::foundation::core::CanvasSpec;
use crate::settings::ResizeMode;

/// Solid canvas in the fill color.
pub fn blank_canvas(canvas: &CanvasSpec) -> RgbImage {
    RgbImage::from_pixel(canvas.width, canvas.height, canvas.fill_color.into())
}

/// Scaled size of a `(w, h)` image under `mode`'s aspect-preserving scale factor.
fn scaled_dims(w: u32, h: u32, canvas: &CanvasSpec, mode: ResizeMode) -> (u32, u32) {
    let sx = f64::from(canvas.width) / f64::from(w);
    let sy = f64::from(canvas.height) / f64::from(h);
    let scale = match mode {
        ResizeMode::Cover => sx.max(sy),
        ResizeMode::Contain | ResizeMode::Stretch => sx.min(sy),
    };
    let nw = ((f64::from(w) * scale).round() as u32).max(1);
    let nh = ((f64::from(h) * scale).round() as u32).max(1);
    match mode {
        ResizeMode::Cover => (nw.max(canvas.width), nh.max(canvas.height)),
        ResizeMode::Contain | ResizeMode::Stretch => (nw.min(canvas.width), nh.min(canvas.height)),
    }
}

/// Turn an optional decoded background into a drawable canvas of exactly the configured size.
///
/// A missing background yields a solid fill. Other color models are converted to RGB by dropping
/// channels (no color management). Size mismatches are resolved with Lanczos3 according to `mode`.
pub fn normalize(
    background: Option<&DynamicImage>,
    canvas: &CanvasSpec,
    mode: ResizeMode,
) -> RgbImage {
    let Some(bg) = background else {
        return blank_canvas(canvas);
    };

    let (w, h) = (bg.width(), bg.height());
    if w == 0 || h == 0 {
        tracing::warn!("background has zero size, using fill");
        return blank_canvas(canvas);
    }

    let rgb = bg.to_rgb8();
    if (w, h) == (canvas.width, canvas.height) {
        return rgb;
    }

    match mode {
        ResizeMode::Stretch => {
            imageops::resize(&rgb, canvas.width, canvas.height, FilterType::Lanczos3)
        }
        ResizeMode::Contain => {
            let (nw, nh) = scaled_dims(w, h, canvas, mode);
            let scaled = imageops::resize(&rgb, nw, nh, FilterType::Lanczos3);
            let mut out = blank_canvas(canvas);
            let x = (canvas.width - nw) / 2;
            let y = (canvas.height - nh) / 2;
            imageops::replace(&mut out, &scaled, i64::from(x), i64::from(y));
            out
        }
        ResizeMode::Cover => {
            let (nw, nh) = scaled_dims(w, h, canvas, mode);
            let scaled = imageops::resize(&rgb, nw, nh, FilterType::Lanczos3);
            let x = (nw - canvas.width) / 2;
            let y = (nh - canvas.height) / 2;
            imageops::crop_imm(&scaled, x, y, canvas.width, canvas.height).to_image()
        }
    }
}
