use std::io::Cursor;
use std::slice::ChunksExact;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use crate::color::Color;
use crate::{LogotraceError, LogotraceResult};

type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Alpha at or above this value counts as opaque foreground.
pub const OPAQUE_ALPHA: u8 = 128;

/// An owned, row-major raster with 3 (RGB) or 4 (RGBA) interleaved channels.
///
/// Pixel `(x, y)` starts at byte `(y * width + x) * channels`. Rasters without an
/// alpha channel read as fully opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap a pixel buffer, validating the channel count and buffer length.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> LogotraceResult<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if !matches!(channels, 3 | 4) || data.len() != expected {
            return Err(LogotraceError::InvalidRaster {
                width,
                height,
                channels,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 4,
            data: image.into_raw(),
        }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 3,
            data: image.into_raw(),
        }
    }

    /// Decode encoded image bytes, keeping an alpha channel only when the source has one.
    pub fn decode(bytes: &[u8]) -> LogotraceResult<Self> {
        let decoded = image::load_from_memory(bytes)?;
        if decoded.color().has_alpha() {
            Ok(Self::from_rgba(decoded.into_rgba8()))
        } else {
            Ok(Self::from_rgb(decoded.into_rgb8()))
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels as usize]
    }

    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        Color::from_slice(self.pixel(x, y))
    }

    #[inline]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if self.has_alpha() {
            self.data[self.offset(x, y) + 3]
        } else {
            255
        }
    }

    /// Iterate over pixels in row-major order.
    pub fn pixels(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(self.channels as usize)
    }

    /// Return the raster with an alpha channel, adding an opaque one if missing.
    pub fn with_alpha(self) -> Self {
        if self.has_alpha() {
            return self;
        }
        let mut data = Vec::with_capacity(self.data.len() / 3 * 4);
        for px in self.data.chunks_exact(3) {
            data.extend_from_slice(px);
            data.push(255);
        }
        Self {
            width: self.width,
            height: self.height,
            channels: 4,
            data,
        }
    }

    /// Copy into an `image` RGBA buffer.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.color_at(x, y);
            Rgba([c.r, c.g, c.b, self.alpha_at(x, y)])
        })
    }

    /// Copy the rectangle at `(x, y)` of size `width × height`.
    ///
    /// The rectangle must lie inside the raster.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let row_len = width as usize * self.channels as usize;
        let mut data = Vec::with_capacity(row_len * height as usize);
        for row in y..y + height {
            let start = self.offset(x, row);
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Self {
            width,
            height,
            channels: self.channels,
            data,
        }
    }

    /// Resample to `width × height` with the given kernel, preserving the channel count.
    ///
    /// Resampling happens on premultiplied alpha so transparent pixels do not bleed
    /// their (meaningless) color into visible edges.
    pub fn resize(&self, width: u32, height: u32, filter: FilterType) -> Self {
        let premultiplied: Rgba16Image = ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let c = self.color_at(x, y);
            let a = self.alpha_at(x, y) as u16;
            Rgba([c.r as u16 * a, c.g as u16 * a, c.b as u16 * a, a * 257])
        });
        let scaled = imageops::resize(&premultiplied, width, height, filter);
        let resized = RgbaImage::from_fn(width, height, |x, y| {
            let [r, g, b, a] = scaled.get_pixel(x, y).0;
            let alpha = ((a as u32 + 128) / 257) as u8;
            if alpha == 0 {
                return Rgba([0, 0, 0, 0]);
            }
            let unscale = |v: u16| ((v as u32 * 257 + a as u32 / 2) / a as u32).min(255) as u8;
            Rgba([unscale(r), unscale(g), unscale(b), alpha])
        });
        if self.has_alpha() {
            Self::from_rgba(resized)
        } else {
            Self::from_rgb(DynamicImage::ImageRgba8(resized).into_rgb8())
        }
    }

    /// Alpha-composite the raster over a solid backdrop, yielding an opaque RGB image.
    pub fn flatten_onto(&self, backdrop: Color) -> RgbImage {
        let base = RgbaImage::from_pixel(
            self.width,
            self.height,
            Rgba([backdrop.r, backdrop.g, backdrop.b, 255]),
        );
        let composed = alpha_composite(&base, &self.to_rgba_image());
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let px = composed.get_pixel(x, y);
            Rgb([px[0], px[1], px[2]])
        })
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> LogotraceResult<Vec<u8>> {
        let dynamic = DynamicImage::ImageRgba8(self.to_rgba_image());
        let dynamic = if self.has_alpha() {
            dynamic
        } else {
            DynamicImage::ImageRgb8(dynamic.into_rgb8())
        };
        let mut bytes = Vec::new();
        dynamic.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Alpha composite `top` over `bottom` (RGBA over operator).
pub fn alpha_composite(bottom: &RgbaImage, top: &RgbaImage) -> RgbaImage {
    let (w, h) = bottom.dimensions();
    let mut out = RgbaImage::new(w, h);

    for ((bg_px, fg_px), out_px) in bottom.pixels().zip(top.pixels()).zip(out.pixels_mut()) {
        let fg_a = fg_px[3] as f32 / 255.0;
        let bg_a = bg_px[3] as f32 / 255.0;
        let out_a = fg_a + bg_a * (1.0 - fg_a);

        let mut rgba = [0u8; 4];
        if out_a > 0.0 {
            let fg_weight = fg_a / out_a;
            let bg_weight = (bg_a * (1.0 - fg_a)) / out_a;
            for c in 0..3 {
                let blended = fg_px[c] as f32 * fg_weight + bg_px[c] as f32 * bg_weight;
                rgba[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
        rgba[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        *out_px = Rgba(rgba);
    }

    out
}
