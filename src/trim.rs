use tracing::debug;

use crate::raster::RasterImage;

/// Margin kept around the visible content when trimming.
pub const TRIM_MARGIN: u32 = 2;

/// Inclusive bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Bounds {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Grow by `margin` on every side without leaving a `width × height` frame.
    pub fn expand(&self, margin: u32, width: u32, height: u32) -> Bounds {
        Bounds {
            min_x: self.min_x.saturating_sub(margin),
            min_y: self.min_y.saturating_sub(margin),
            max_x: (self.max_x + margin).min(width - 1),
            max_y: (self.max_y + margin).min(height - 1),
        }
    }
}

/// Bounding box of all pixels with non-zero alpha, or `None` if there are none.
pub fn alpha_bounds(image: &RasterImage) -> Option<Bounds> {
    let (w, h) = image.dimensions();
    let mut bounds: Option<Bounds> = None;
    for y in 0..h {
        for x in 0..w {
            if image.alpha_at(x, y) == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => Bounds {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            });
        }
    }
    bounds
}

/// A trimmed raster and where its top-left pixel sat in the untrimmed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trimmed {
    pub image: RasterImage,
    pub origin: (u32, u32),
}

/// Crop away fully transparent borders, keeping a small margin, and remember the
/// crop origin.
///
/// Fully transparent images are returned unchanged at origin `(0, 0)`.
pub fn trim_with_origin(image: RasterImage) -> Trimmed {
    let (w, h) = image.dimensions();
    let Some(content) = alpha_bounds(&image) else {
        debug!("no visible pixels; skipping trim");
        return Trimmed {
            image,
            origin: (0, 0),
        };
    };
    let crop = content.expand(TRIM_MARGIN, w, h);
    if crop.width() == w && crop.height() == h {
        return Trimmed {
            image,
            origin: (0, 0),
        };
    }
    debug!(?crop, "trimming transparent border");
    Trimmed {
        image: image.crop(crop.min_x, crop.min_y, crop.width(), crop.height()),
        origin: (crop.min_x, crop.min_y),
    }
}

/// Crop away fully transparent borders, keeping a small margin.
pub fn trim_transparent(image: RasterImage) -> RasterImage {
    trim_with_origin(image).image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn dot_at(size: u32, x: u32, y: u32) -> RasterImage {
        let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
        img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        RasterImage::from_rgba(img)
    }

    mod alpha_bounds {
        use super::*;

        #[test]
        fn empty_for_transparent_image() {
            let image = RasterImage::from_rgba(RgbaImage::new(4, 4));
            assert_eq!(alpha_bounds(&image), None);
        }

        #[test]
        fn faint_pixels_count() {
            let mut img = RgbaImage::new(6, 6);
            img.put_pixel(1, 2, Rgba([0, 0, 0, 1]));
            img.put_pixel(4, 3, Rgba([0, 0, 0, 255]));
            let bounds = alpha_bounds(&RasterImage::from_rgba(img)).unwrap();
            assert_eq!(
                bounds,
                Bounds {
                    min_x: 1,
                    min_y: 2,
                    max_x: 4,
                    max_y: 3
                }
            );
        }
    }

    mod trim_transparent {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn keeps_two_pixel_margin() {
                let out = trim_transparent(dot_at(20, 10, 10));
                assert_eq!(out.dimensions(), (5, 5));
                assert_eq!(out.alpha_at(2, 2), 255);
            }

            #[test]
            fn margin_is_clamped_at_edges() {
                let out = trim_transparent(dot_at(20, 0, 19));
                assert_eq!(out.dimensions(), (3, 3));
                assert_eq!(out.alpha_at(0, 2), 255);
            }

            #[test]
            fn origin_is_the_crop_corner() {
                let trimmed = trim_with_origin(dot_at(20, 10, 3));
                assert_eq!(trimmed.origin, (8, 1));
                assert_eq!(trimmed.image.dimensions(), (5, 5));
            }

            #[test]
            fn untouched_image_keeps_zero_origin() {
                let trimmed = trim_with_origin(dot_at(3, 1, 1));
                assert_eq!(trimmed.origin, (0, 0));
                assert_eq!(trimmed.image.dimensions(), (3, 3));
            }

            #[test]
            fn transparent_image_passes_through() {
                let image = RasterImage::from_rgba(RgbaImage::new(7, 3));
                assert_eq!(trim_transparent(image.clone()), image);
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                /// trim_transparent: trimming an already trimmed image is a no-op
                #[test]
                fn second_trim_is_noop(
                    size in 1u32..40,
                    x in 0u32..40,
                    y in 0u32..40,
                    x2 in 0u32..40,
                    y2 in 0u32..40
                ) {
                    let mut img = RgbaImage::new(size, size);
                    img.put_pixel(x % size, y % size, Rgba([1, 2, 3, 200]));
                    img.put_pixel(x2 % size, y2 % size, Rgba([4, 5, 6, 9]));
                    let once = trim_transparent(RasterImage::from_rgba(img));
                    let twice = trim_transparent(once.clone());
                    prop_assert_eq!(once, twice);
                }
            }
        }
    }
}
