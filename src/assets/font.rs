use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{MemeError, MemeResult};

/// Where caption glyphs come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// Scalable font file on disk (TTF/OTF/TTC).
    Path(PathBuf),
    /// In-memory font file contents.
    Bytes(Arc<Vec<u8>>),
}

impl FontSource {
    fn read(&self) -> MemeResult<Arc<Vec<u8>>> {
        match self {
            Self::Path(p) => {
                let bytes =
                    std::fs::read(p).with_context(|| format!("read font '{}'", p.display()))?;
                Ok(Arc::new(bytes))
            }
            Self::Bytes(b) => Ok(Arc::clone(b)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrush {
    /// Opaque brush.
    pub fn opaque(rgb: crate::foundation::core::Rgb8) -> Self {
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            a: 255,
        }
    }
}

/// A scalable face registered with a [`TextEngine`].
#[derive(Clone)]
pub struct ScalableFace {
    family: String,
    data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for ScalableFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalableFace")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl ScalableFace {
    /// Family name Parley resolved from the font bytes.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font data handed to the rasterizer.
    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }
}

/// Face used when no scalable font can be loaded at all.
///
/// Every character advances by half the font size; visible characters are drawn as solid boxes.
/// The output is crude but deterministic and needs no font data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuiltinFace;

impl BuiltinFace {
    /// Horizontal advance of one character.
    pub fn advance(size_px: f32) -> f32 {
        size_px / 2.0
    }

    /// Width of `text` laid out on one line.
    pub fn text_width(text: &str, size_px: f32) -> f32 {
        text.chars().count() as f32 * Self::advance(size_px)
    }
}

/// Font face selected for a render call.
#[derive(Clone, Debug)]
pub enum FontFace {
    /// Real outlines shaped by Parley.
    Scalable(ScalableFace),
    /// Box-glyph fallback.
    Builtin(BuiltinFace),
}

impl FontFace {
    /// `true` for the box-glyph fallback.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }
}

/// Stateful helper for building Parley text layouts from registered font bytes.
///
/// One engine is created per render call; it is not shared across calls.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    /// Construct an engine with fresh, empty Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register font bytes and return a face that can be laid out and rasterized.
    pub fn load_face(&mut self, bytes: Arc<Vec<u8>>, index: u32) -> MemeResult<ScalableFace> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MemeError::font("no font families registered from font bytes"))?;

        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MemeError::font("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            index,
        );
        Ok(ScalableFace { family, data })
    }

    /// Shape `text` as a single unwrapped line.
    pub fn layout_line(
        &mut self,
        face: &ScalableFace,
        text: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> MemeResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MemeError::font("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Families tried, in order, when the requested font is unusable.
const SYSTEM_FAMILY_PREFERENCE: &[&str] = &[
    "Microsoft YaHei",
    "Noto Sans CJK SC",
    "Source Han Sans SC",
    "PingFang SC",
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
];

/// Bytes of an installed face, read once and reused across render calls.
#[derive(Clone)]
pub struct SystemFont {
    bytes: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for SystemFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFont")
            .field("len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Locate an installed sans-serif face.
///
/// Preference list first, then the face whose family name sorts first, so the choice does not
/// depend on directory enumeration order. Scans every system font directory; call once and keep
/// the result.
pub fn system_default_font() -> Option<SystemFont> {
    use usvg::fontdb;

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    if db.len() == 0 {
        return None;
    }

    let mut families: Vec<fontdb::Family<'_>> = SYSTEM_FAMILY_PREFERENCE
        .iter()
        .map(|name| fontdb::Family::Name(*name))
        .collect();
    families.push(fontdb::Family::SansSerif);

    let id = db
        .query(&fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        })
        .or_else(|| {
            db.faces()
                .min_by(|a, b| {
                    let fa = a.families.first().map(|(n, _)| n.as_str()).unwrap_or("");
                    let fb = b.families.first().map(|(n, _)| n.as_str()).unwrap_or("");
                    fa.cmp(fb).then_with(|| a.post_script_name.cmp(&b.post_script_name))
                })
                .map(|f| f.id)
        })?;

    db.with_face_data(id, |data, index| SystemFont {
        bytes: Arc::new(data.to_vec()),
        index,
    })
}

/// Pick the face for one render call.
///
/// Requested font, then the installed face found by [`system_default_font`] (if any), then
/// [`BuiltinFace`]. Every failure is logged and recovered; this never errors.
pub fn resolve_face(
    engine: &mut TextEngine,
    requested: Option<&FontSource>,
    system: Option<&SystemFont>,
) -> FontFace {
    if let Some(src) = requested {
        match src.read().and_then(|bytes| engine.load_face(bytes, 0)) {
            Ok(face) => {
                tracing::debug!(family = face.family(), "loaded requested font");
                return FontFace::Scalable(face);
            }
            Err(e) => tracing::warn!(error = %e, "requested font unusable, falling back"),
        }
    }

    if let Some(system) = system {
        match engine.load_face(Arc::clone(&system.bytes), system.index) {
            Ok(face) => {
                tracing::debug!(family = face.family(), "using system default font");
                return FontFace::Scalable(face);
            }
            Err(e) => tracing::warn!(error = %e, "system default font unusable"),
        }
    }

    tracing::warn!("no scalable font available, using builtin box face");
    FontFace::Builtin(BuiltinFace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_do_not_register() {
        let mut engine = TextEngine::new();
        let err = engine
            .load_face(Arc::new(b"definitely not a font".to_vec()), 0)
            .unwrap_err();
        assert!(matches!(err, MemeError::Font(_)));
    }

    #[test]
    fn missing_font_without_system_fallback_is_builtin() {
        let mut engine = TextEngine::new();
        let src = FontSource::Path(PathBuf::from("/no/such/font.ttf"));
        let face = resolve_face(&mut engine, Some(&src), None);
        assert!(face.is_builtin());

        let face = resolve_face(&mut engine, None, None);
        assert!(face.is_builtin());
    }

    #[test]
    fn corrupt_bytes_without_system_fallback_is_builtin() {
        let mut engine = TextEngine::new();
        let src = FontSource::Bytes(Arc::new(vec![0u8; 64]));
        assert!(resolve_face(&mut engine, Some(&src), None).is_builtin());
    }

    #[test]
    fn builtin_width_is_half_size_per_char() {
        assert_eq!(BuiltinFace::text_width("abcd", 20.0), 40.0);
        assert_eq!(BuiltinFace::text_width("", 20.0), 0.0);
    }

    #[test]
    fn system_font_when_present_lays_out_text() {
        let Some(system) = system_default_font() else {
            return;
        };
        let mut engine = TextEngine::new();
        let FontFace::Scalable(face) = resolve_face(&mut engine, None, Some(&system)) else {
            return;
        };
        let layout = engine
            .layout_line(&face, "Ay", 40.0, TextBrush::default())
            .unwrap();
        assert!(layout.height() > 0.0);
        assert!(layout.width() > 0.0);
    }
}
