use crate::foundation::error::{RaytideError, RaytideResult};

/// Output canvas dimensions in pixels.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> RaytideResult<Self> {
        if width == 0 || height == 0 {
            return Err(RaytideError::validation("canvas dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Total number of pixels.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black, the framebuffer clear color.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Build an opaque color from RGB channels.
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Pack into a single little-endian `u32` cell (byte order r, g, b, a).
    pub(crate) fn pack(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of [`Rgba8::pack`].
    pub(crate) fn unpack(cell: u32) -> Self {
        let [r, g, b, a] = cell.to_le_bytes();
        Self { r, g, b, a }
    }
}

/// A rendered or in-progress frame as tightly packed row-major RGBA8 bytes.
///
/// This is the only "wire format" crossing into the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major (`4 * width * height` bytes).
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Pixel value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `(x, y)` is outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = 4 * ((y as usize) * (self.width as usize) + (x as usize));
        Rgba8 {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }
}
