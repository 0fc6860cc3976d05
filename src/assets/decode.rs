use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{MemeError, MemeResult};

/// Largest SVG raster edge we are willing to allocate.
const MAX_SVG_DIM: u32 = 16_384;

/// Decode raster background bytes (any format `image` was built with).
pub fn decode_image(bytes: &[u8]) -> MemeResult<image::DynamicImage> {
    let img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(img)
}

/// Parse and rasterize an SVG at its intrinsic size, composited over `matte`.
pub fn decode_svg(bytes: &[u8], matte: Rgb8) -> MemeResult<image::DynamicImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    fn to_px(v: f32) -> MemeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(MemeError::image("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let (w, h) = (to_px(size.width())?, to_px(size.height())?);
    if w > MAX_SVG_DIM || h > MAX_SVG_DIM {
        return Err(MemeError::image(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| MemeError::image("failed to allocate svg pixmap"))?;
    pixmap.fill(resvg::tiny_skia::Color::from_rgba8(
        matte.r, matte.g, matte.b, 255,
    ));
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    // Opaque after the matte fill, so premultiplied bytes equal straight bytes.
    let rgba = image::RgbaImage::from_raw(w, h, pixmap.take())
        .ok_or_else(|| MemeError::image("svg pixmap size mismatch"))?;
    Ok(image::DynamicImage::ImageRgba8(rgba))
}

fn looks_like_svg(path: &Path, bytes: &[u8]) -> bool {
    let by_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if by_ext {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Read and decode a background file.
///
/// SVG files (by extension or content sniffing) are rasterized over `matte`; everything else goes
/// through the raster decoders.
pub fn load_background(path: impl AsRef<Path>, matte: Rgb8) -> MemeResult<image::DynamicImage> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read background '{}'", path.display()))?;
    if looks_like_svg(path, &bytes) {
        decode_svg(&bytes, matte)
    } else {
        decode_image(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_png_dimensions() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
        let decoded = decode_image(&png_bytes(image::DynamicImage::ImageRgba8(img))).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn decode_garbage_is_an_error() {
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn svg_rasterizes_over_matte() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
            <rect x="0" y="0" width="2" height="2" fill="#ff0000"/>
        </svg>"##;
        let img = decode_svg(svg, Rgb8::new(0, 0, 255)).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(3, 1).0, [0, 0, 255]);

        assert!(decode_svg(b"<svg", Rgb8::GRAY).is_err());
    }

    #[test]
    fn load_background_sniffs_svg_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bg.data");
        std::fs::write(
            &p,
            br#"<svg xmlns="http://www.w3.org/2000/svg" width="5" height="5"></svg>"#,
        )
        .unwrap();
        let img = load_background(&p, Rgb8::GRAY).unwrap();
        assert_eq!((img.width(), img.height()), (5, 5));

        let err = load_background(dir.path().join("missing.png"), Rgb8::GRAY).unwrap_err();
        assert!(err.to_string().contains("read background"));
    }
}
