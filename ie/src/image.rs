//! Image primitives and utilities.
//!
//! Screen captures are stored in a lightweight owned RGB image type
//! (`OwnedImage`). Cue detection only ever reads single scan lines, so most
//! work happens on a borrowed view (`Image<'a>`) that can be cropped without
//! copying pixels.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Build an `OwnedImage` from RGBA bytes (alpha is discarded).
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = if width == 0 { 0 } else { bytes.len() / width / 4 };
        let data = bytes
            .chunks_exact(4)
            .take(width * height)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    /// Build an `OwnedImage` from row-major pixels.
    ///
    /// Missing trailing pixels are filled with black, extra pixels are dropped.
    pub fn from_pixels(width: u32, height: u32, mut data: Vec<Color>) -> Self {
        data.resize(pixel_count(width, height), Color::BLACK);
        Self {
            width,
            height,
            data,
        }
    }

    /// Convert any decoded image (alpha is discarded).
    pub fn from_dynamic(img: &image::DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let data = rgb
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                Color::new(r, g, b)
            })
            .collect();

        Self {
            width,
            height,
            data,
        }
    }

    /// Decode an image file (any format the `image` crate understands).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).with_context(|| format!("decode image {:?}", path))?;
        Ok(Self::from_dynamic(&img))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    /// Color at view-relative coordinates, `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(*self.pixel(self.x1 + x, self.y1 + y))
    }

    /// Pixels of row `y`, left to right. Empty if `y` is outside the view.
    pub fn row(&self, y: u32) -> Vec<Color> {
        if y >= self.height() {
            return Vec::new();
        }
        (self.x1..self.x2)
            .map(|x| *self.pixel(x, self.y1 + y))
            .collect()
    }

    /// Pixels of column `x`, top to bottom. Empty if `x` is outside the view.
    pub fn column(&self, x: u32) -> Vec<Color> {
        if x >= self.width() {
            return Vec::new();
        }
        (self.y1..self.y2)
            .map(|y| *self.pixel(self.x1 + x, y))
            .collect()
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes.extend_from_slice(&[clr.r, clr.g, clr.b]);
            }
        }
        bytes
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.get_bytes();
        let img = image::RgbImage::from_raw(self.width(), self.height(), bytes)
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Create an arbitrary subimage (relative coordinates).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }
}

// ----------

/// RGB color.
///
/// Serialized as a `#rrggbb` string. Deserialization also accepts
/// `[r, g, b]` arrays and `{ "r": .., "g": .., "b": .. }` objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "ColorRepr", into = "String")]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel bounded difference test.
    ///
    /// True iff every channel of `self` lies within
    /// `[target - tolerance, target + tolerance]`. With a tolerance of 0 this
    /// is plain equality.
    #[inline]
    pub fn within_tolerance(&self, target: Color, tolerance: u8) -> bool {
        let t = i16::from(tolerance);

        (i16::from(self.r) - i16::from(target.r)).abs() <= t
            && (i16::from(self.g) - i16::from(target.g)).abs() <= t
            && (i16::from(self.b) - i16::from(target.b)).abs() <= t
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseColorError(String);

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Array([u8; 3]),
    Object { r: u8, g: u8, b: u8 },
}

impl TryFrom<ColorRepr> for Color {
    type Error = ParseColorError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => Color::from_hex(&s),
            ColorRepr::Array(rgb) => Ok(rgb.into()),
            ColorRepr::Object { r, g, b } => Ok(Color::new(r, g, b)),
        }
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
