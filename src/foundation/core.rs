use crate::foundation::error::{MemeError, MemeResult};

pub use kurbo::{Point, Rect};

/// Opaque 8-bit RGB color.
///
/// Deserializes from `"#RRGGBB"` (case-insensitive, `#` optional) or a `[r, g, b]` array of
/// integers in `0..=255`. Serializes back to the hex form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white, the default caption fill.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black, used for outlines.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Mid gray used for missing backgrounds.
    pub const GRAY: Self = Self::new(128, 128, 128);

    /// Build a color from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `#RRGGBB`.
    pub fn from_hex(s: &str) -> MemeResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return Err(MemeError::validation(
                "hex color must be #RRGGBB (case-insensitive)",
            ));
        }

        fn hex_byte(pair: &str) -> MemeResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| MemeError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        ))
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for image::Rgb<u8> {
    fn from(c: Rgb8) -> Self {
        image::Rgb(c.to_array())
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<i64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => {
                if v.len() != 3 {
                    return Err(serde::de::Error::custom(
                        "rgb array must have len 3 ([r,g,b])",
                    ));
                }
                let mut out = [0u8; 3];
                for (dst, src) in out.iter_mut().zip(v) {
                    *dst = u8::try_from(src).map_err(|_| {
                        serde::de::Error::custom(format!("rgb channel {src} outside 0..=255"))
                    })?;
                }
                Ok(Self::from(out))
            }
        }
    }
}

/// Fixed output raster dimensions plus the color used where no background pixels exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Solid fill for missing backgrounds and letterbox bars.
    pub fill_color: Rgb8,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
            fill_color: Rgb8::GRAY,
        }
    }
}

impl CanvasSpec {
    /// Validate non-zero dimensions that the rasterizer can address.
    pub fn validate(&self) -> MemeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MemeError::validation("canvas width/height must be > 0"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(MemeError::validation(format!(
                "canvas {}x{} exceeds {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(())
    }
}

/// Sub-rectangle of the canvas that captions may occupy.
///
/// Text is horizontally centered on the canvas, limited to `max_width`, and bottom-anchored at
/// `bottom_y`; it never rises above [`TextRegion::top_y`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextRegion {
    /// Widest allowed line in pixels.
    pub max_width: u32,
    /// Bottom boundary of the text block.
    pub bottom_y: u32,
    /// Tallest allowed text block.
    pub max_height: u32,
}

impl Default for TextRegion {
    fn default() -> Self {
        Self {
            max_width: 800,
            bottom_y: 880,
            max_height: 300,
        }
    }
}

impl TextRegion {
    /// Upper boundary of the region.
    pub fn top_y(&self) -> u32 {
        self.bottom_y.saturating_sub(self.max_height)
    }

    /// Region as a rectangle on a canvas of `canvas_width`.
    pub fn rect(&self, canvas_width: u32) -> Rect {
        let inset = f64::from(canvas_width.saturating_sub(self.max_width)) / 2.0;
        Rect::new(
            inset,
            f64::from(self.top_y()),
            inset + f64::from(self.max_width),
            f64::from(self.bottom_y),
        )
    }

    /// Check the region against the canvas it is drawn on.
    pub fn validate(&self, canvas: &CanvasSpec) -> MemeResult<()> {
        if self.max_width == 0 || self.max_width > canvas.width {
            return Err(MemeError::validation(
                "text region max_width must be in 1..=canvas width",
            ));
        }
        if self.max_height == 0 || self.max_height >= canvas.height {
            return Err(MemeError::validation(
                "text region max_height must be > 0 and < canvas height",
            ));
        }
        if self.bottom_y > canvas.height {
            return Err(MemeError::validation(
                "text region bottom_y must be <= canvas height",
            ));
        }
        if self.max_height > self.bottom_y {
            return Err(MemeError::validation(
                "text region max_height must be <= bottom_y",
            ));
        }
        Ok(())
    }
}

/// Font-size search bounds in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SizeBounds {
    /// Requested (largest) size.
    pub max: u32,
    /// Smallest size the search may select.
    pub min: u32,
    /// Decrement per search step.
    pub step: u32,
}

impl SizeBounds {
    /// Largest candidate; a request below `min` is raised to `min`.
    pub fn effective_max(self) -> u32 {
        self.max.max(self.min)
    }

    /// Decrement; zero is treated as one so the search always terminates.
    pub fn effective_step(self) -> u32 {
        self.step.max(1)
    }

    /// Candidate sizes in search order.
    pub fn candidates(self) -> impl Iterator<Item = u32> {
        let min = self.min;
        let step = self.effective_step();
        std::iter::successors(Some(self.effective_max()), move |s| s.checked_sub(step))
            .take_while(move |s| *s >= min)
    }
}
