//! RGBA drawing surface and PNG encoding
//!
//! An owned pixel buffer with the drawing operations the waveform
//! renderer needs: solid fills, clipped bar rectangles, and per-bar
//! vertical gradients.

use thiserror::Error;

/// Rasterization errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid surface dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error("pixel buffer does not match {0}x{1} RGBA")]
    BufferMismatch(u32, u32),

    #[error("invalid color value: {0}")]
    InvalidColor(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a `#rrggbb` hex color string
    pub fn from_hex(hex: &str) -> Result<Self, RenderError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(RenderError::InvalidColor(hex.to_string()));
        }

        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| RenderError::InvalidColor(hex.to_string()))
        };

        Ok(Self::opaque(parse(0..2)?, parse(2..4)?, parse(4..6)?))
    }

    /// Linear interpolation toward `other`, `t` in [0, 1]
    fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// An in-memory RGBA raster target
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a blank (transparent black) surface
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        })
    }

    /// Wrap an existing RGBA buffer (e.g. a decoded video frame)
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(width, height));
        }
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(RenderError::BufferMismatch(width, height));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read back a single pixel; `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(Rgba {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        })
    }

    fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
        self.pixels[i + 3] = color.a;
    }

    /// Fill the whole surface with one color
    pub fn fill(&mut self, color: Rgba) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = color.a;
        }
    }

    /// Fill an axis-aligned rectangle, clipped to the surface
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for yy in y.min(self.height)..y_end {
            for xx in x.min(self.width)..x_end {
                self.put_pixel(xx, yy, color);
            }
        }
    }

    /// Fill a rectangle with a vertical gradient over its own bounds
    ///
    /// `bottom` is the color of the lowest row, `top` of the highest.
    pub fn fill_rect_gradient(&mut self, x: u32, y: u32, w: u32, h: u32, bottom: Rgba, top: Rgba) {
        if h == 0 || w == 0 {
            return;
        }
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for yy in y.min(self.height)..y_end {
            let t = if h > 1 {
                (y + h - 1 - yy) as f32 / (h - 1) as f32
            } else {
                0.0
            };
            let color = bottom.lerp(top, t);
            for xx in x.min(self.width)..x_end {
                self.put_pixel(xx, yy, color);
            }
        }
    }

    /// Encode the surface as a PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();

        let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .write_image_data(&self.pixels)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        Ok(out)
    }
}
