use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};

use crate::foundation::error::{MemeError, MemeResult};

/// Size of the `BITMAPFILEHEADER` that precedes the DIB in a `.bmp` file.
const BMP_FILE_HEADER_LEN: usize = 14;

fn encode(img: &RgbImage, format: ImageFormat) -> MemeResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|e| MemeError::image(format!("encode {format:?}: {e}")))?;
    Ok(buf)
}

/// PNG file bytes.
pub fn encode_png(img: &RgbImage) -> MemeResult<Vec<u8>> {
    encode(img, ImageFormat::Png)
}

/// Device-independent bitmap: a BMP file without its 14-byte file header.
///
/// This is the payload clipboard APIs expect for `CF_DIB`.
pub fn encode_dib(img: &RgbImage) -> MemeResult<Vec<u8>> {
    let bmp = encode(img, ImageFormat::Bmp)?;
    if bmp.len() <= BMP_FILE_HEADER_LEN || !bmp.starts_with(b"BM") {
        return Err(MemeError::image("bmp encoder produced no file header"));
    }
    Ok(bmp[BMP_FILE_HEADER_LEN..].to_vec())
}

/// Write `img` as PNG, creating parent directories.
pub fn save_png(img: &RgbImage, path: impl AsRef<Path>) -> MemeResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let bytes = encode_png(img)?;
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "saved image");
    Ok(())
}

/// Aspect-preserving thumbnail no larger than `max_w x max_h`.
///
/// Images already within bounds are returned unchanged.
pub fn preview(img: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    if max_w == 0 || max_h == 0 || (w <= max_w && h <= max_h) {
        return img.clone();
    }
    let scale = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    let nw = ((f64::from(w) * scale).round() as u32).clamp(1, max_w);
    let nh = ((f64::from(h) * scale).round() as u32).clamp(1, max_h);
    image::imageops::resize(img, nw, nh, FilterType::Lanczos3)
}

/// `<unix seconds>.png`.
pub fn timestamped_png_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{secs}.png")
}

/// Fresh output path inside `folder`.
pub fn output_path(folder: impl AsRef<Path>) -> PathBuf {
    folder.as_ref().join(timestamped_png_name())
}
