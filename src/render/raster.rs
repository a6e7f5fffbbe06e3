use std::io::Cursor;
use std::ops::Range;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use super::glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::{validate_surface_size, Color, DrawSurface, Point, Rect, TextAlign};
use crate::{ReplayError, ReplayResult};

/// An RGBA pixel buffer.
///
/// A pixel is painted when its center lies inside the shape, so results are
/// exact and repeatable: no anti-aliasing, no dependence on draw history beyond
/// overdraw order. Translucent colors are blended source-over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Creates a black, fully transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidRequest`] if the size is zero or too large.
    pub fn new(width: u32, height: u32) -> ReplayResult<Self> {
        validate_surface_size(width, height)?;
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// The underlying image.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consumes the surface, returning the underlying image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw pixel bytes, row-major RGBA.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The color of one pixel, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|p| {
            let [r, g, b, a] = p.0;
            Color { r, g, b, a }
        })
    }

    /// Encodes the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::SurfaceError`] if encoding fails.
    pub fn encode_png(&self) -> ReplayResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.image
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|err| ReplayError::SurfaceError {
                context: format!("PNG encoding failed: {}", err),
            })?;
        Ok(bytes.into_inner())
    }

    /// Writes the surface to `path` as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::SurfaceError`] if the file cannot be written.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ReplayResult<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| ReplayError::SurfaceError {
                context: format!("could not write {}: {}", path.display(), err),
            })
    }

    fn plot(&mut self, x: u32, y: u32, color: Color) {
        let pixel = self.image.get_pixel_mut(x, y);
        pixel.0 = blend(pixel.0, color);
    }
}

fn blend(dst: [u8; 4], src: Color) -> [u8; 4] {
    match src.a {
        0xff => src.to_rgba(),
        0 => dst,
        alpha => {
            let a = u16::from(alpha);
            let inv = 255 - a;
            let mix = |s: u8, d: u8| ((u16::from(s) * a + u16::from(d) * inv + 127) / 255) as u8;
            let out_alpha = (a + u16::from(dst[3]) * inv / 255).min(255) as u8;
            [
                mix(src.r, dst[0]),
                mix(src.g, dst[1]),
                mix(src.b, dst[2]),
                out_alpha,
            ]
        },
    }
}

/// Pixel indices whose centers fall in `[start, start + len)`, clipped to `0..limit`.
fn covered(start: f32, len: f32, limit: u32) -> Range<u32> {
    if !(start.is_finite() && len.is_finite()) || len <= 0.0 {
        return 0..0;
    }
    let lo = (start - 0.5).ceil().max(0.0);
    let hi = (start + len - 0.5).ceil().min(limit as f32);
    if hi <= lo {
        return 0..0;
    }
    lo as u32..hi as u32
}

impl DrawSurface for RasterSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_background(&mut self, color: Color) {
        let rgba = Rgba(color.with_alpha(0xff).to_rgba());
        for pixel in self.image.pixels_mut() {
            *pixel = rgba;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let xs = covered(rect.x, rect.width, self.width());
        let ys = covered(rect.y, rect.height, self.height());
        for y in ys {
            for x in xs.clone() {
                self.plot(x, y, color);
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let xs = covered(center.x - radius, radius * 2.0, self.width());
        let ys = covered(center.y - radius, radius * 2.0, self.height());
        let r2 = radius * radius;
        for y in ys {
            let dy = y as f32 + 0.5 - center.y;
            for x in xs.clone() {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.plot(x, y, color);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, anchor: Point, size: f32, align: TextAlign, color: Color) {
        if !(size.is_finite() && size > 0.0) {
            return;
        }
        let cell = size / GLYPH_HEIGHT as f32;
        let width = glyphs::text_width(text, size);
        let left = match align {
            TextAlign::Left => anchor.x,
            TextAlign::Center => anchor.x - width / 2.0,
            TextAlign::Right => anchor.x - width,
        };
        let top = anchor.y - size;

        for (i, c) in text.chars().enumerate() {
            let origin_x = left + (i as u32 * GLYPH_ADVANCE) as f32 * cell;
            for (row, bits) in glyphs::glyph(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        self.fill_rect(
                            Rect::new(
                                origin_x + col as f32 * cell,
                                top + row as f32 * cell,
                                cell,
                                cell,
                            ),
                            color,
                        );
                    }
                }
            }
        }
    }
}
